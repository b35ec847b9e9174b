use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use vetclinic_core::{
    errors::ClinicError,
    models::{client::Client, pet::Pet},
};
use vetclinic_db::repositories::{client, pet};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Default, Deserialize)]
pub struct ClientSearchQuery {
    pub search: Option<String>,
}

#[axum::debug_handler]
pub async fn list_clients(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ClientSearchQuery>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = client::list_clients(&state.db_pool, query.search.as_deref())
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(clients))
}

#[axum::debug_handler]
pub async fn list_client_pets(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Pet>>, AppError> {
    client::get_client_by_id(&state.db_pool, id)
        .await
        .map_err(ClinicError::Database)?
        .ok_or_else(|| ClinicError::NotFound(format!("Client with ID {} not found", id)))?;

    let pets = pet::list_pets_by_owner(&state.db_pool, id)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(pets))
}
