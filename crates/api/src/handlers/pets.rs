use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use vetclinic_core::{
    errors::{ClinicError, ClinicResult},
    models::pet::{MergePetsRequest, Pet},
};
use vetclinic_db::repositories::pet::{self, MergeOutcome};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Default, Deserialize)]
pub struct SimilarPetsQuery {
    pub name: Option<String>,
}

/// Rejects merges that could never succeed before any row is locked.
pub fn check_merge_request(request: &MergePetsRequest) -> ClinicResult<()> {
    if request.keep_pet_id == request.remove_pet_id {
        return Err(ClinicError::Validation(
            "A pet cannot be merged into itself".to_string(),
        ));
    }
    Ok(())
}

pub fn merged_pet(outcome: MergeOutcome) -> ClinicResult<Pet> {
    match outcome {
        MergeOutcome::Merged(pet) => Ok(pet),
        MergeOutcome::Missing(id) => {
            Err(ClinicError::NotFound(format!("Pet with ID {} not found", id)))
        }
        MergeOutcome::Mismatch => Err(ClinicError::Conflict(
            "Only pets with the same name and type can be merged".to_string(),
        )),
    }
}

#[axum::debug_handler]
pub async fn find_similar_pets(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SimilarPetsQuery>,
) -> Result<Json<Vec<Pet>>, AppError> {
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ClinicError::Validation("Pet name is required".to_string()))?;

    let pets = pet::find_similar_pets_by_name(&state.db_pool, name)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(pets))
}

#[axum::debug_handler]
pub async fn merge_pets(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<MergePetsRequest>,
) -> Result<Json<Pet>, AppError> {
    check_merge_request(&payload)?;

    let outcome = pet::merge_pets(&state.db_pool, payload.keep_pet_id, payload.remove_pet_id)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(merged_pet(outcome)?))
}
