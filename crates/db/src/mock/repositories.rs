use mockall::mock;
use vetclinic_core::models::{
    appointment::{Appointment, AppointmentStatus, CreateAppointmentRequest, UpdateAppointmentRequest},
    calendar::DateRange,
    client::Client,
    employee::Employee,
    pet::Pet,
    waiting_room::{AddToWaitingRoomRequest, Priority, WaitingRoomEntry, WaitingRoomStats},
};

use crate::repositories::{pet::MergeOutcome, waiting_room::Transition};

// Mock repositories for testing
mock! {
    pub AppointmentRepo {
        pub async fn create_appointment(
            &self,
            request: CreateAppointmentRequest,
        ) -> eyre::Result<Appointment>;

        pub async fn get_appointment_by_id(
            &self,
            id: i64,
        ) -> eyre::Result<Option<Appointment>>;

        pub async fn list_appointments(
            &self,
            range: Option<DateRange>,
        ) -> eyre::Result<Vec<Appointment>>;

        pub async fn update_appointment(
            &self,
            id: i64,
            request: UpdateAppointmentRequest,
        ) -> eyre::Result<Appointment>;

        pub async fn change_status(
            &self,
            id: i64,
            status: AppointmentStatus,
        ) -> eyre::Result<Appointment>;

        pub async fn delete_appointment(
            &self,
            id: i64,
        ) -> eyre::Result<bool>;
    }
}

mock! {
    pub ClientRepo {
        pub async fn list_clients(
            &self,
            search: Option<&'static str>,
        ) -> eyre::Result<Vec<Client>>;

        pub async fn get_client_by_id(
            &self,
            id: i64,
        ) -> eyre::Result<Option<Client>>;
    }
}

mock! {
    pub PetRepo {
        pub async fn get_pet_by_id(
            &self,
            id: i64,
        ) -> eyre::Result<Option<Pet>>;

        pub async fn list_pets_by_owner(
            &self,
            client_id: i64,
        ) -> eyre::Result<Vec<Pet>>;

        pub async fn find_similar_pets_by_name(
            &self,
            name: &'static str,
        ) -> eyre::Result<Vec<Pet>>;

        pub async fn merge_pets(
            &self,
            keep_pet_id: i64,
            remove_pet_id: i64,
        ) -> eyre::Result<MergeOutcome>;
    }
}

mock! {
    pub EmployeeRepo {
        pub async fn list_employees(&self) -> eyre::Result<Vec<Employee>>;

        pub async fn get_employee_by_id(
            &self,
            id: i64,
        ) -> eyre::Result<Option<Employee>>;
    }
}

mock! {
    pub WaitingRoomRepo {
        pub async fn add_entry(
            &self,
            request: AddToWaitingRoomRequest,
        ) -> eyre::Result<WaitingRoomEntry>;

        pub async fn get_entry(
            &self,
            id: i64,
        ) -> eyre::Result<Option<WaitingRoomEntry>>;

        pub async fn has_active_entry(
            &self,
            pet_id: i64,
        ) -> eyre::Result<bool>;

        pub async fn list_current(&self) -> eyre::Result<Vec<WaitingRoomEntry>>;

        pub async fn transition_entry(
            &self,
            id: i64,
            transition: Transition,
        ) -> eyre::Result<Option<WaitingRoomEntry>>;

        pub async fn update_priority(
            &self,
            id: i64,
            priority: Priority,
        ) -> eyre::Result<Option<WaitingRoomEntry>>;

        pub async fn stats(&self, today: DateRange) -> eyre::Result<WaitingRoomStats>;
    }
}
