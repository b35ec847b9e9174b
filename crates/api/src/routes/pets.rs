use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/pets/similar", get(handlers::pets::find_similar_pets))
        .route("/api/pets/merge", post(handlers::pets::merge_pets))
}
