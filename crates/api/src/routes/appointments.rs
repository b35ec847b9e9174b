use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment)
                .patch(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        .route(
            "/api/appointments/:id/status",
            put(handlers::appointments::change_status),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(handlers::appointments::cancel_appointment),
        )
}
