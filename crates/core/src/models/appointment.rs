use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::pet::PetType;

/// Length of an appointment when only the start is known.
pub fn default_appointment_length() -> Duration {
    Duration::hours(1)
}

pub const MAX_REASON_LENGTH: usize = 500;
pub const MAX_NOTES_LENGTH: usize = 1000;
pub const MAX_GUEST_NAME_LENGTH: usize = 100;
pub const MAX_GUEST_PHONE_LENGTH: usize = 15;
pub const MAX_GUEST_EMAIL_LENGTH: usize = 100;

pub const UNSPECIFIED_CLIENT: &str = "Unspecified client";
pub const UNASSIGNED_EMPLOYEE: &str = "Unassigned";

wire_enum! {
    /// Kind of service an appointment books.
    pub enum ServiceType {
        Medical => ("MEDICAL", "Medical"),
        Grooming => ("GROOMING", "Grooming"),
    }
}

wire_enum! {
    pub enum AppointmentStatus {
        Scheduled => ("SCHEDULED", "Scheduled"),
        Confirmed => ("CONFIRMED", "Confirmed"),
        InProgress => ("IN_PROGRESS", "In progress"),
        Completed => ("COMPLETED", "Completed"),
        Cancelled => ("CANCELLED", "Cancelled"),
        NoShow => ("NO_SHOW", "No show"),
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

/// Contact details for a walk-in client that has no registered record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestClientInfo {
    pub name: String,
    pub phone: Option<String>,
    pub pet_type: Option<PetType>,
    pub breed: Option<String>,
    pub email: Option<String>,
}

/// An appointment as returned by the service.
///
/// Besides the stored columns it carries denormalized display fields (client,
/// pet and employee names) and a few derived flags so list consumers never
/// need a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub service_type: ServiceType,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub client_id: Option<i64>,
    pub pet_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub pet_name: Option<String>,
    pub pet_breed: Option<String>,
    pub employee_name: Option<String>,
    pub guest_client: Option<GuestClientInfo>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub has_registered_client: bool,
    #[serde(default)]
    pub requires_veterinarian: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Recomputes `title` and the derived flags from the stored fields.
    pub fn with_derived_fields(mut self) -> Self {
        self.title = appointment_title(
            self.client_name.as_deref(),
            self.guest_client.as_ref(),
            self.service_type,
        );
        self.completed = self.status == AppointmentStatus::Completed;
        self.cancelled = self.status == AppointmentStatus::Cancelled;
        self.has_registered_client = self.client_id.is_some();
        self.requires_veterinarian = self.service_type == ServiceType::Medical;
        if self.employee_name.is_none() && self.employee_id.is_none() {
            self.employee_name = Some(UNASSIGNED_EMPLOYEE.to_string());
        }
        self
    }
}

/// Display name of whoever the appointment is for: the registered client,
/// then the guest, then a placeholder.
pub fn client_display_name(client_name: Option<&str>, guest: Option<&GuestClientInfo>) -> String {
    if let Some(name) = client_name.filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    match guest {
        Some(guest) if !guest.name.trim().is_empty() => guest.name.clone(),
        _ => UNSPECIFIED_CLIENT.to_string(),
    }
}

pub fn appointment_title(
    client_name: Option<&str>,
    guest: Option<&GuestClientInfo>,
    service_type: ServiceType,
) -> String {
    format!(
        "{} - {}",
        client_display_name(client_name, guest),
        service_type.display_name()
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub service_type: ServiceType,
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub client_id: Option<i64>,
    pub pet_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub guest_client: Option<GuestClientInfo>,
}

wire_enum! {
    /// Optional appointment fields an update can reset to empty.
    pub enum ClearableField {
        Reason => ("REASON", "Reason"),
        Notes => ("NOTES", "Notes"),
        Client => ("CLIENT", "Client"),
        Pet => ("PET", "Pet"),
        Employee => ("EMPLOYEE", "Employee"),
        GuestClient => ("GUEST_CLIENT", "Guest client"),
    }
}

/// Partial update: fields left as `None` are not touched, fields listed in
/// `clear` are set to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_client: Option<GuestClientInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clear: Vec<ClearableField>,
}

impl UpdateAppointmentRequest {
    /// A reschedule: only the time window changes.
    pub fn reschedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clears(&self, field: ClearableField) -> bool {
        self.clear.contains(&field)
    }

    /// Whether the request carries a new value for `field`.
    pub fn sets(&self, field: ClearableField) -> bool {
        match field {
            ClearableField::Reason => self.reason.is_some(),
            ClearableField::Notes => self.notes.is_some(),
            ClearableField::Client => self.client_id.is_some(),
            ClearableField::Pet => self.pet_id.is_some(),
            ClearableField::Employee => self.employee_id.is_some(),
            ClearableField::GuestClient => self.guest_client.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

/// Notes after cancelling with `reason`; blank reasons leave notes as they were.
pub fn notes_after_cancellation(notes: Option<&str>, reason: Option<&str>) -> Option<String> {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => match notes.filter(|n| !n.trim().is_empty()) {
            Some(current) => Some(format!("{current}\nCancellation reason: {reason}")),
            None => Some(format!("Cancellation reason: {reason}")),
        },
        None => notes.map(str::to_string),
    }
}
