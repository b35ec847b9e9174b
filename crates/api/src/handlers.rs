pub mod appointments;
pub mod clients;
pub mod employees;
pub mod pets;
pub mod waiting_room;
