use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use vetclinic_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::{
            Appointment, CancelAppointmentRequest, ChangeStatusRequest, ClearableField,
            CreateAppointmentRequest, UpdateAppointmentRequest,
        },
        calendar::DateRange,
    },
    validation,
};
use vetclinic_db::repositories::{appointment, client, employee, pet};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Interprets `?start=&end=`; both bounds or neither must be given.
pub fn parse_range(query: &RangeQuery) -> ClinicResult<Option<DateRange>> {
    match (query.start.as_deref(), query.end.as_deref()) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let range = DateRange::parse(start, end).map_err(|e| {
                ClinicError::Validation(format!("Invalid date range: {}", e))
            })?;
            if !range.is_valid() {
                return Err(ClinicError::Validation(
                    "Range end must not be before its start".to_string(),
                ));
            }
            Ok(Some(range))
        }
        _ => Err(ClinicError::Validation(
            "Both start and end are required to filter by range".to_string(),
        )),
    }
}

/// Checks that every referenced record exists and that the pet, when
/// given, belongs to the client.
async fn ensure_references(
    pool: &PgPool,
    client_id: Option<i64>,
    pet_id: Option<i64>,
    employee_id: Option<i64>,
) -> Result<(), AppError> {
    if let Some(id) = client_id {
        client::get_client_by_id(pool, id)
            .await
            .map_err(ClinicError::Database)?
            .ok_or_else(|| ClinicError::NotFound(format!("Client with ID {} not found", id)))?;
    }
    if let Some(id) = employee_id {
        employee::get_employee_by_id(pool, id)
            .await
            .map_err(ClinicError::Database)?
            .ok_or_else(|| ClinicError::NotFound(format!("Employee with ID {} not found", id)))?;
    }
    if let Some(pet_id) = pet_id {
        pet::get_pet_by_id(pool, pet_id)
            .await
            .map_err(ClinicError::Database)?
            .ok_or_else(|| ClinicError::NotFound(format!("Pet with ID {} not found", pet_id)))?;

        let client_id = client_id.ok_or_else(|| {
            ClinicError::Validation(
                "A pet can only be booked together with its registered owner".to_string(),
            )
        })?;
        let owned = pet::is_pet_owned_by(pool, pet_id, client_id)
            .await
            .map_err(ClinicError::Database)?;
        if !owned {
            return Err(AppError(ClinicError::Validation(format!(
                "Pet {} does not belong to client {}",
                pet_id, client_id
            ))));
        }
    }
    Ok(())
}

/// Client id, guest presence and pet id the appointment will have once
/// `update` is applied to `current`.
pub fn resulting_parties(
    update: &UpdateAppointmentRequest,
    current: &Appointment,
) -> (Option<i64>, bool, Option<i64>) {
    let client_id = if update.clears(ClearableField::Client) {
        None
    } else {
        update.client_id.or(current.client_id)
    };
    let has_guest = !update.clears(ClearableField::GuestClient)
        && (update.guest_client.is_some() || current.guest_client.is_some());
    let pet_id = if update.clears(ClearableField::Pet) {
        None
    } else {
        update.pet_id.or(current.pet_id)
    };
    (client_id, has_guest, pet_id)
}

async fn find_appointment(pool: &PgPool, id: i64) -> Result<Appointment, AppError> {
    let appointment = appointment::get_appointment_by_id(pool, id)
        .await
        .map_err(ClinicError::Database)?
        .ok_or_else(|| ClinicError::NotFound(format!("Appointment with ID {} not found", id)))?;
    Ok(appointment)
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let range = parse_range(&query)?;

    let appointments = appointment::list_appointments(&state.db_pool, range)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    validation::validate_create(&payload)?;
    ensure_references(
        &state.db_pool,
        payload.client_id,
        payload.pet_id,
        payload.employee_id,
    )
    .await?;

    let created = appointment::create_appointment(&state.db_pool, &payload)
        .await
        .map_err(ClinicError::Database)?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(find_appointment(&state.db_pool, id).await?))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    // Window checks that need no storage come first.
    if let (Some(start), Some(end)) = (payload.start, payload.end) {
        validation::validate_time_window(start, end)?;
    }

    let current = find_appointment(&state.db_pool, id).await?;
    validation::validate_update(&payload, current.start, current.end)?;

    if payload.is_empty() {
        return Ok(Json(current));
    }

    let (client_id, has_guest, pet_id) = resulting_parties(&payload, &current);
    validation::validate_parties(client_id, has_guest, pet_id)?;

    // Ownership is only rechecked when the client or the pet changes.
    let pet_to_check = if payload.sets(ClearableField::Client)
        || payload.sets(ClearableField::Pet)
        || payload.clears(ClearableField::Client)
    {
        pet_id
    } else {
        None
    };
    ensure_references(&state.db_pool, client_id, pet_to_check, payload.employee_id).await?;

    let updated = appointment::update_appointment(&state.db_pool, id, &payload)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn change_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ChangeStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    find_appointment(&state.db_pool, id).await?;

    let updated = appointment::change_status(&state.db_pool, id, payload.status)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    payload: Option<Json<CancelAppointmentRequest>>,
) -> Result<Json<Appointment>, AppError> {
    let Json(payload) = payload.unwrap_or_default();
    find_appointment(&state.db_pool, id).await?;

    let cancelled = appointment::cancel_appointment(&state.db_pool, id, payload.reason.as_deref())
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(cancelled))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = appointment::delete_appointment(&state.db_pool, id)
        .await
        .map_err(ClinicError::Database)?;

    if !deleted {
        return Err(AppError(ClinicError::NotFound(format!(
            "Appointment with ID {} not found",
            id
        ))));
    }

    Ok(StatusCode::NO_CONTENT)
}
