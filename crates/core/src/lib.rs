//! # VetClinic Core
//!
//! Domain types shared by the clinic service, its storage layer and the
//! calendar client: appointments and the records they reference, the
//! visible calendar window, validation rules and the service error type.

pub mod config;
pub mod errors;
pub mod models;
pub mod validation;
