use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use vetclinic_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        calendar::DateRange,
        waiting_room::{
            AddToWaitingRoomRequest, CancelEntryRequest, QueueAction, UpdatePriorityRequest,
            WaitingRoomEntry, WaitingRoomStats, notes_after_queue_cancellation,
        },
    },
    validation,
};
use vetclinic_db::repositories::{
    client, pet,
    waiting_room::{self, Transition},
};

use crate::{middleware::error_handling::AppError, ApiState};

/// Works out the status change `action` makes to `entry`. A cancellation
/// appends `reason` to the entry notes.
pub fn plan_transition(
    entry: &WaitingRoomEntry,
    action: QueueAction,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> ClinicResult<Transition> {
    let to = entry.status.apply(action)?;
    let notes = match (action, reason) {
        (QueueAction::Cancel, Some(reason)) => Some(notes_after_queue_cancellation(
            entry.notes.as_deref(),
            reason,
            at,
        )),
        _ => None,
    };
    Ok(Transition {
        from: entry.status,
        to,
        notes,
        at,
    })
}

pub fn ensure_not_queued(pet_id: i64, already_queued: bool) -> ClinicResult<()> {
    if already_queued {
        return Err(ClinicError::Conflict(format!(
            "Pet with ID {} is already in the waiting room",
            pet_id
        )));
    }
    Ok(())
}

/// Maps a guarded update that matched no row.
pub fn transitioned(id: i64, updated: Option<WaitingRoomEntry>) -> ClinicResult<WaitingRoomEntry> {
    updated.ok_or_else(|| {
        ClinicError::Conflict(format!(
            "Waiting room entry {} changed while it was being updated",
            id
        ))
    })
}

fn entry_not_found(id: i64) -> ClinicError {
    ClinicError::NotFound(format!("Waiting room entry with ID {} not found", id))
}

#[axum::debug_handler]
pub async fn list_waiting_room(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<WaitingRoomEntry>>, AppError> {
    let entries = waiting_room::list_current(&state.db_pool)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(entries))
}

#[axum::debug_handler]
pub async fn add_to_waiting_room(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<AddToWaitingRoomRequest>,
) -> Result<(StatusCode, Json<WaitingRoomEntry>), AppError> {
    validation::validate_queue_entry(&payload)?;

    let pool = &state.db_pool;
    client::get_client_by_id(pool, payload.client_id)
        .await
        .map_err(ClinicError::Database)?
        .ok_or_else(|| {
            ClinicError::NotFound(format!("Client with ID {} not found", payload.client_id))
        })?;
    let owned = pet::is_pet_owned_by(pool, payload.pet_id, payload.client_id)
        .await
        .map_err(ClinicError::Database)?;
    if !owned {
        return Err(ClinicError::Validation(format!(
            "Pet {} does not belong to client {}",
            payload.pet_id, payload.client_id
        ))
        .into());
    }
    let queued = waiting_room::has_active_entry(pool, payload.pet_id)
        .await
        .map_err(ClinicError::Database)?;
    ensure_not_queued(payload.pet_id, queued)?;

    let entry = waiting_room::add_entry(pool, &payload, Utc::now())
        .await
        .map_err(ClinicError::Database)?;

    tracing::info!(
        "Pet {} joined the waiting room as entry {:?}",
        payload.pet_id, entry.id
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

#[axum::debug_handler]
pub async fn waiting_room_stats(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<WaitingRoomStats>, AppError> {
    let stats = waiting_room::stats(&state.db_pool, DateRange::day_of(Utc::now()))
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(stats))
}

async fn advance(
    state: &ApiState,
    id: i64,
    action: QueueAction,
    reason: Option<&str>,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    let entry = waiting_room::get_entry(&state.db_pool, id)
        .await
        .map_err(ClinicError::Database)?
        .ok_or_else(|| entry_not_found(id))?;

    let transition = plan_transition(&entry, action, reason, Utc::now())?;
    let updated = waiting_room::transition_entry(&state.db_pool, id, &transition)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(transitioned(id, updated)?))
}

#[axum::debug_handler]
pub async fn start_consultation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    advance(&state, id, QueueAction::StartConsultation, None).await
}

#[axum::debug_handler]
pub async fn complete_consultation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    advance(&state, id, QueueAction::Complete, None).await
}

#[axum::debug_handler]
pub async fn cancel_entry(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(payload): Json<CancelEntryRequest>,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    validation::validate_queue_cancellation(&payload)?;
    advance(&state, id, QueueAction::Cancel, Some(&payload.reason)).await
}

#[axum::debug_handler]
pub async fn update_priority(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePriorityRequest>,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    let entry = waiting_room::update_priority(&state.db_pool, id, payload.priority)
        .await
        .map_err(ClinicError::Database)?
        .ok_or_else(|| entry_not_found(id))?;

    Ok(Json(entry))
}
