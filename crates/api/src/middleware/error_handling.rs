//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and a JSON body of the form
//! `{"error": "<message>"}` so every endpoint fails the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vetclinic_core::errors::ClinicError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use vetclinic_api::middleware::error_handling::AppError;
/// use vetclinic_core::errors::ClinicError;
///
/// async fn handler(id: i64) -> Result<Json<i64>, AppError> {
///     if id < 0 {
///         return Err(AppError(ClinicError::NotFound(format!("Appointment with ID {} not found", id))));
///     }
///     Ok(Json(id))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ClinicError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::Conflict(_) => StatusCode::CONFLICT,
            ClinicError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Allows `?` on `Result<T, ClinicError>` inside handlers.
impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError(err)
    }
}

/// Repository failures surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ClinicError::Database(err))
    }
}

pub fn map_error(err: ClinicError) -> Response {
    AppError(err).into_response()
}
