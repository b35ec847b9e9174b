use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/waiting-room",
            get(handlers::waiting_room::list_waiting_room)
                .post(handlers::waiting_room::add_to_waiting_room),
        )
        .route(
            "/api/waiting-room/stats",
            get(handlers::waiting_room::waiting_room_stats),
        )
        .route(
            "/api/waiting-room/:id/start",
            post(handlers::waiting_room::start_consultation),
        )
        .route(
            "/api/waiting-room/:id/complete",
            post(handlers::waiting_room::complete_consultation),
        )
        .route(
            "/api/waiting-room/:id/cancel",
            post(handlers::waiting_room::cancel_entry),
        )
        .route(
            "/api/waiting-room/:id/priority",
            put(handlers::waiting_room::update_priority),
        )
}
