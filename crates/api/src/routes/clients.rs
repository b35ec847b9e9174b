use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/clients", get(handlers::clients::list_clients))
        .route("/api/clients/:id/pets", get(handlers::clients::list_client_pets))
}
