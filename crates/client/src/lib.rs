//! # VetClinic Client
//!
//! Client side of the appointment calendar: typed adapters over the clinic
//! REST service, a refetchable list state per entity, the calendar
//! controller and the appointment modals it drives, and the live
//! waiting room.

pub mod calendar;
pub mod config;
pub mod gateway;
pub mod list;
pub mod merge;
pub mod modal;
pub mod notification;
pub mod waiting_room;
