use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vetclinic_core::models::{
    appointment::{Appointment, GuestClientInfo},
    client::Client,
    employee::Employee,
    pet::Pet,
    waiting_room::WaitingRoomEntry,
};

/// An appointment row joined with the names of the records it points at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service_type: String,
    pub status: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub client_id: Option<i64>,
    pub pet_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_pet_type: Option<String>,
    pub guest_breed: Option<String>,
    pub guest_email: Option<String>,
    pub client_first_name: Option<String>,
    pub client_last_name: Option<String>,
    pub client_phone: Option<String>,
    pub pet_name: Option<String>,
    pub pet_breed: Option<String>,
    pub employee_first_name: Option<String>,
    pub employee_last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DbAppointment {
    pub fn into_domain(self) -> Result<Appointment> {
        let guest_client = match self.guest_name {
            Some(name) => Some(GuestClientInfo {
                name,
                phone: self.guest_phone,
                pet_type: self
                    .guest_pet_type
                    .as_deref()
                    .map(str::parse)
                    .transpose()
                    .wrap_err("Stored guest pet type is not recognized")?,
                breed: self.guest_breed,
                email: self.guest_email,
            }),
            None => None,
        };

        let appointment = Appointment {
            id: Some(self.id),
            title: String::new(),
            start: self.start_at,
            end: self.end_at,
            service_type: self
                .service_type
                .parse()
                .wrap_err("Stored service type is not recognized")?,
            status: self
                .status
                .parse()
                .wrap_err("Stored appointment status is not recognized")?,
            reason: self.reason,
            notes: self.notes,
            client_id: self.client_id,
            pet_id: self.pet_id,
            employee_id: self.employee_id,
            client_name: join_name(self.client_first_name, self.client_last_name),
            client_phone: self.client_phone,
            pet_name: self.pet_name,
            pet_breed: self.pet_breed,
            employee_name: join_name(self.employee_first_name, self.employee_last_name),
            guest_client,
            completed: false,
            cancelled: false,
            has_registered_client: false,
            requires_veterinarian: false,
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
        };

        Ok(appointment.with_derived_fields())
    }
}

fn join_name(first: Option<String>, last: Option<String>) -> Option<String> {
    match (first, last) {
        (None, None) => None,
        (first, last) => Some(
            format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
                .trim()
                .to_string(),
        ),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbClient> for Client {
    fn from(row: DbClient) -> Self {
        Client {
            id: Some(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            email: row.email,
        }
    }
}

/// A pet row with the ids of all its owners aggregated in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPet {
    pub id: i64,
    pub name: String,
    pub pet_type: String,
    pub breed: Option<String>,
    pub active: bool,
    pub owner_ids: Vec<i64>,
}

impl DbPet {
    pub fn into_domain(self) -> Result<Pet> {
        Ok(Pet {
            id: Some(self.id),
            name: self.name,
            pet_type: self
                .pet_type
                .parse()
                .wrap_err("Stored pet type is not recognized")?,
            breed: self.breed,
            active: self.active,
            owner_ids: self.owner_ids,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEmployee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub active: bool,
}

impl DbEmployee {
    pub fn into_domain(self) -> Result<Employee> {
        Ok(Employee {
            id: Some(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            role: self
                .role
                .parse()
                .wrap_err("Stored employee role is not recognized")?,
        })
    }
}

/// A waiting-room row joined with its client and pet names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWaitingRoomEntry {
    pub id: i64,
    pub client_id: i64,
    pub pet_id: i64,
    pub client_first_name: Option<String>,
    pub client_last_name: Option<String>,
    pub pet_name: Option<String>,
    pub arrival_time: DateTime<Utc>,
    pub status: String,
    pub priority: String,
    pub reason_for_visit: Option<String>,
    pub notes: Option<String>,
    pub consultation_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DbWaitingRoomEntry {
    pub fn into_domain(self) -> Result<WaitingRoomEntry> {
        Ok(WaitingRoomEntry {
            id: Some(self.id),
            client_id: self.client_id,
            pet_id: self.pet_id,
            client_name: join_name(self.client_first_name, self.client_last_name),
            pet_name: self.pet_name,
            arrival_time: self.arrival_time,
            status: self
                .status
                .parse()
                .wrap_err("Stored waiting status is not recognized")?,
            priority: self
                .priority
                .parse()
                .wrap_err("Stored priority is not recognized")?,
            reason_for_visit: self.reason_for_visit,
            notes: self.notes,
            consultation_started_at: self.consultation_started_at,
            completed_at: self.completed_at,
        })
    }
}
