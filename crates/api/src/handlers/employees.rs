use axum::{extract::State, Json};
use std::sync::Arc;
use vetclinic_core::{errors::ClinicError, models::employee::Employee};
use vetclinic_db::repositories::employee;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn list_employees(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = employee::list_employees(&state.db_pool)
        .await
        .map_err(ClinicError::Database)?;

    Ok(Json(employees))
}
