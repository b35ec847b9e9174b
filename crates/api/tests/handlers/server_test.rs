use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::test_server;

#[tokio::test]
async fn test_health_check() {
    let server = test_server();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_version_reports_crate_version() {
    let server = test_server();

    let response = server.get("/version").await;

    assert_eq!(
        response.json::<Value>()["version"],
        json!(env!("CARGO_PKG_VERSION"))
    );
}

#[test_log::test(tokio::test)]
async fn test_create_with_end_before_start_is_rejected() {
    let server = test_server();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "start": "2025-03-10T10:00:00Z",
            "end": "2025-03-10T09:00:00Z",
            "service_type": "MEDICAL",
            "client_id": 1
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Validation error: Appointment end must not be before its start" })
    );
}

#[test_log::test(tokio::test)]
async fn test_create_without_client_or_guest_is_rejected() {
    let server = test_server();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "start": "2025-03-10T09:00:00Z",
            "end": "2025-03-10T10:00:00Z",
            "service_type": "GROOMING"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_patch_with_inverted_window_is_rejected() {
    let server = test_server();

    let response = server
        .patch("/api/appointments/1")
        .json(&json!({
            "start": "2025-03-10T12:00:00Z",
            "end": "2025-03-10T11:00:00Z"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_list_with_malformed_range_is_rejected() {
    let server = test_server();

    let response = server
        .get("/api/appointments")
        .add_query_param("start", "yesterday")
        .add_query_param("end", "2025-03-10T00:00:00Z")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_similar_pets_requires_a_name() {
    let server = test_server();

    let response = server.get("/api/pets/similar").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Validation error: Pet name is required" })
    );
}

#[test_log::test(tokio::test)]
async fn test_merge_pet_into_itself_is_rejected_over_http() {
    let server = test_server();

    let response = server
        .post("/api/pets/merge")
        .json(&json!({ "keep_pet_id": 4, "remove_pet_id": 4 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_queue_entry_without_reason_is_rejected() {
    let server = test_server();

    let response = server
        .post("/api/waiting-room")
        .json(&json!({ "client_id": 1, "pet_id": 2, "reason_for_visit": " " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Validation error: Reason for visit is required" })
    );
}

#[test_log::test(tokio::test)]
async fn test_queue_cancellation_without_reason_is_rejected() {
    let server = test_server();

    let response = server
        .post("/api/waiting-room/3/cancel")
        .json(&json!({ "reason": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
