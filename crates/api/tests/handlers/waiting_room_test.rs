use axum::{http::StatusCode, Json};
use mockall::predicate;
use pretty_assertions::assert_eq;
use vetclinic_api::{
    handlers::waiting_room::{ensure_not_queued, plan_transition, transitioned},
    middleware::error_handling::AppError,
};
use vetclinic_core::{
    errors::ClinicError,
    models::waiting_room::{
        AddToWaitingRoomRequest, Priority, QueueAction, WaitingRoomEntry, WaitingStatus,
    },
    validation::validate_queue_entry,
};
use vetclinic_db::repositories::waiting_room::Transition;

use crate::test_utils::{at, queue_entry, TestContext};

async fn add_wrapper(
    ctx: &mut TestContext,
    request: AddToWaitingRoomRequest,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    validate_queue_entry(&request)?;
    let queued = ctx.waiting_room_repo.has_active_entry(request.pet_id).await?;
    ensure_not_queued(request.pet_id, queued)?;
    let entry = ctx.waiting_room_repo.add_entry(request).await?;
    Ok(Json(entry))
}

async fn advance_wrapper(
    ctx: &mut TestContext,
    id: i64,
    action: QueueAction,
    reason: Option<&str>,
) -> Result<Json<WaitingRoomEntry>, AppError> {
    let entry = ctx
        .waiting_room_repo
        .get_entry(id)
        .await?
        .ok_or_else(|| ClinicError::NotFound(format!("Waiting room entry with ID {} not found", id)))?;
    let transition = plan_transition(&entry, action, reason, at(10))?;
    let updated = ctx.waiting_room_repo.transition_entry(id, transition).await?;
    Ok(Json(transitioned(id, updated)?))
}

fn request(pet_id: i64) -> AddToWaitingRoomRequest {
    AddToWaitingRoomRequest {
        client_id: 1,
        pet_id,
        reason_for_visit: "Limping".to_string(),
        priority: Priority::Urgent,
        notes: None,
    }
}

#[tokio::test]
async fn test_add_to_waiting_room() {
    let mut ctx = TestContext::new();
    ctx.waiting_room_repo
        .expect_has_active_entry()
        .with(predicate::eq(2))
        .times(1)
        .returning(|_| Ok(false));
    ctx.waiting_room_repo
        .expect_add_entry()
        .with(predicate::eq(request(2)))
        .times(1)
        .returning(|_| Ok(queue_entry(5, WaitingStatus::Waiting)));

    let Json(entry) = add_wrapper(&mut ctx, request(2)).await.unwrap();

    assert_eq!(entry.id, Some(5));
    assert_eq!(entry.status, WaitingStatus::Waiting);
}

#[tokio::test]
async fn test_pet_already_waiting_is_a_conflict() {
    let mut ctx = TestContext::new();
    ctx.waiting_room_repo
        .expect_has_active_entry()
        .returning(|_| Ok(true));
    ctx.waiting_room_repo.expect_add_entry().times(0);

    let error = add_wrapper(&mut ctx, request(2)).await.unwrap_err();

    assert_eq!(error.status(), StatusCode::CONFLICT);
    assert_eq!(
        error.0.to_string(),
        "Conflict: Pet with ID 2 is already in the waiting room"
    );
}

#[tokio::test]
async fn test_start_consultation_records_the_start() {
    let mut ctx = TestContext::new();
    ctx.waiting_room_repo
        .expect_get_entry()
        .with(predicate::eq(5))
        .returning(|id| Ok(Some(queue_entry(id, WaitingStatus::Waiting))));
    ctx.waiting_room_repo
        .expect_transition_entry()
        .with(
            predicate::eq(5),
            predicate::eq(Transition {
                from: WaitingStatus::Waiting,
                to: WaitingStatus::InConsultation,
                notes: None,
                at: at(10),
            }),
        )
        .times(1)
        .returning(|id, _| {
            let mut entry = queue_entry(id, WaitingStatus::InConsultation);
            entry.consultation_started_at = Some(at(10));
            Ok(Some(entry))
        });

    let Json(entry) = advance_wrapper(&mut ctx, 5, QueueAction::StartConsultation, None)
        .await
        .unwrap();

    assert_eq!(entry.status, WaitingStatus::InConsultation);
    assert_eq!(entry.consultation_started_at, Some(at(10)));
}

#[tokio::test]
async fn test_completing_a_waiting_entry_is_a_conflict() {
    let mut ctx = TestContext::new();
    ctx.waiting_room_repo
        .expect_get_entry()
        .returning(|id| Ok(Some(queue_entry(id, WaitingStatus::Waiting))));
    ctx.waiting_room_repo.expect_transition_entry().times(0);

    let error = advance_wrapper(&mut ctx, 5, QueueAction::Complete, None)
        .await
        .unwrap_err();

    assert_eq!(error.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_advancing_missing_entry_is_not_found() {
    let mut ctx = TestContext::new();
    ctx.waiting_room_repo.expect_get_entry().returning(|_| Ok(None));

    let error = advance_wrapper(&mut ctx, 9, QueueAction::Cancel, Some("Left"))
        .await
        .unwrap_err();

    assert_eq!(error.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entry_changed_concurrently_is_a_conflict() {
    let mut ctx = TestContext::new();
    ctx.waiting_room_repo
        .expect_get_entry()
        .returning(|id| Ok(Some(queue_entry(id, WaitingStatus::InConsultation))));
    ctx.waiting_room_repo
        .expect_transition_entry()
        .returning(|_, _| Ok(None));

    let error = advance_wrapper(&mut ctx, 5, QueueAction::Complete, None)
        .await
        .unwrap_err();

    assert_eq!(error.status(), StatusCode::CONFLICT);
}

#[test]
fn test_cancel_plan_appends_reason_to_notes() {
    let mut entry = queue_entry(5, WaitingStatus::Waiting);
    entry.notes = Some("Nervous dog".to_string());

    let transition = plan_transition(&entry, QueueAction::Cancel, Some("Owner left"), at(10)).unwrap();

    assert_eq!(transition.to, WaitingStatus::Cancelled);
    assert_eq!(
        transition.notes.as_deref(),
        Some("Nervous dog\nCancelled at 2025-03-10 10:00: Owner left")
    );
}
