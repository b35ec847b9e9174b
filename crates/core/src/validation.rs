//! Appointment and waiting-room rules enforced by the service before anything is stored.
//!
//! The calendar client checks the cheap subset of these (required fields,
//! time window, text lengths) before submitting a form; the service always
//! re-checks the full set.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::errors::{ClinicError, ClinicResult};
use crate::models::appointment::{
    CreateAppointmentRequest, GuestClientInfo, MAX_GUEST_EMAIL_LENGTH, MAX_GUEST_NAME_LENGTH,
    MAX_GUEST_PHONE_LENGTH, MAX_NOTES_LENGTH, MAX_REASON_LENGTH, UpdateAppointmentRequest,
};
use crate::models::waiting_room::{AddToWaitingRoomRequest, CancelEntryRequest};

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(809|849|829)\d{7}$").expect("phone pattern is valid"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

pub fn validate_time_window(start: DateTime<Utc>, end: DateTime<Utc>) -> ClinicResult<()> {
    if start > end {
        return Err(ClinicError::Validation(
            "Appointment end must not be before its start".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_text_lengths(reason: Option<&str>, notes: Option<&str>) -> ClinicResult<()> {
    if reason.is_some_and(|r| r.chars().count() > MAX_REASON_LENGTH) {
        return Err(ClinicError::Validation(format!(
            "Reason cannot exceed {MAX_REASON_LENGTH} characters"
        )));
    }
    if notes.is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH) {
        return Err(ClinicError::Validation(format!(
            "Notes cannot exceed {MAX_NOTES_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_guest(guest: &GuestClientInfo) -> ClinicResult<()> {
    let name = guest.name.trim();
    if name.is_empty() {
        return Err(ClinicError::Validation("Guest name is required".to_string()));
    }
    if name.chars().count() > MAX_GUEST_NAME_LENGTH {
        return Err(ClinicError::Validation(format!(
            "Guest name cannot exceed {MAX_GUEST_NAME_LENGTH} characters"
        )));
    }
    if let Some(phone) = guest.phone.as_deref() {
        if phone.len() > MAX_GUEST_PHONE_LENGTH || !PHONE_PATTERN.is_match(phone) {
            return Err(ClinicError::Validation(
                "Guest phone must be 809, 849 or 829 followed by 7 digits".to_string(),
            ));
        }
    }
    if let Some(email) = guest.email.as_deref() {
        if email.len() > MAX_GUEST_EMAIL_LENGTH || !EMAIL_PATTERN.is_match(email) {
            return Err(ClinicError::Validation(
                "Guest email must be a valid address".to_string(),
            ));
        }
    }
    Ok(())
}

/// Full check of a new appointment, excluding anything that needs storage.
pub fn validate_create(request: &CreateAppointmentRequest) -> ClinicResult<()> {
    validate_time_window(request.start, request.end)?;
    validate_text_lengths(request.reason.as_deref(), request.notes.as_deref())?;
    if let Some(guest) = &request.guest_client {
        validate_guest(guest)?;
    }
    validate_parties(
        request.client_id,
        request.guest_client.is_some(),
        request.pet_id,
    )
}

/// Who the appointment is for: a registered client or a guest, and a pet
/// only together with its client.
pub fn validate_parties(
    client_id: Option<i64>,
    has_guest: bool,
    pet_id: Option<i64>,
) -> ClinicResult<()> {
    if client_id.is_none() && !has_guest {
        return Err(ClinicError::Validation(
            "Either a registered client or guest client details are required".to_string(),
        ));
    }
    if pet_id.is_some() && client_id.is_none() {
        return Err(ClinicError::Validation(
            "A pet can only be booked together with its registered owner".to_string(),
        ));
    }
    Ok(())
}

/// Checks a partial update against the window it would produce.
pub fn validate_update(
    request: &UpdateAppointmentRequest,
    current_start: DateTime<Utc>,
    current_end: DateTime<Utc>,
) -> ClinicResult<()> {
    if let Some(field) = request.clear.iter().find(|field| request.sets(**field)) {
        return Err(ClinicError::Validation(format!(
            "{} cannot be both set and cleared",
            field.display_name()
        )));
    }
    let start = request.start.unwrap_or(current_start);
    let end = request.end.unwrap_or(current_end);
    validate_time_window(start, end)?;
    validate_text_lengths(request.reason.as_deref(), request.notes.as_deref())?;
    if let Some(guest) = &request.guest_client {
        validate_guest(guest)?;
    }
    Ok(())
}

pub fn validate_queue_entry(request: &AddToWaitingRoomRequest) -> ClinicResult<()> {
    if request.reason_for_visit.trim().is_empty() {
        return Err(ClinicError::Validation(
            "Reason for visit is required".to_string(),
        ));
    }
    validate_text_lengths(Some(&request.reason_for_visit), request.notes.as_deref())
}

pub fn validate_queue_cancellation(request: &CancelEntryRequest) -> ClinicResult<()> {
    if request.reason.trim().is_empty() {
        return Err(ClinicError::Validation(
            "A cancellation reason is required".to_string(),
        ));
    }
    validate_text_lengths(Some(&request.reason), None)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}
