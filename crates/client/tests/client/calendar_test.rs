use mockall::predicate;
use pretty_assertions::assert_eq;
use vetclinic_client::{
    calendar::{
        CalendarController, CalendarEvent, DropOutcome, EventDrop, CREATED_MESSAGE,
        RESCHEDULED_MESSAGE, UPDATED_MESSAGE,
    },
    config::RescheduleStrategy,
    modal::{FormField, SubmitOutcome},
    notification::{Notification, NotificationLevel},
};
use vetclinic_core::{
    errors::Failure,
    models::{
        appointment::{ServiceType, UpdateAppointmentRequest},
        calendar::DateRange,
    },
};

use crate::fixtures::{appointment, at, march, MockAppointments};

fn listing(mock: &mut MockAppointments, times: usize) {
    mock.expect_list()
        .times(times)
        .returning(|_| Ok(vec![Some(appointment(1, 10, 9)), Some(appointment(2, 11, 14))]));
}

async fn mounted(
    mock: MockAppointments,
    strategy: RescheduleStrategy,
) -> CalendarController<MockAppointments> {
    let mut calendar = CalendarController::new(mock, strategy);
    assert!(calendar.dates_set(march()).await);
    calendar
}

fn event(calendar: &CalendarController<MockAppointments>, id: &str) -> CalendarEvent {
    calendar
        .events()
        .into_iter()
        .find(|e| e.id == id)
        .expect("event is rendered")
}

#[tokio::test]
async fn test_same_window_in_another_format_fetches_once() {
    let mut mock = MockAppointments::new();
    mock.expect_list()
        .with(predicate::eq(
            DateRange::parse("2025-01-01T00:00:00Z", "2025-01-31T23:59:00Z").unwrap(),
        ))
        .times(1)
        .returning(|_| Ok(vec![]));
    let mut calendar = CalendarController::new(mock, RescheduleStrategy::KeepMoved);

    assert!(calendar
        .dates_set_str("2025-01-01T00:00:00Z", "2025-01-31T23:59:00Z")
        .await
        .unwrap());
    assert!(!calendar
        .dates_set_str("2025-01-01T00:00:00.000+00:00", "2025-01-31T23:59:00.000Z")
        .await
        .unwrap());
    let shifted = DateRange::parse("2025-01-01T01:00:00+01:00", "2025-01-31T23:59:00Z").unwrap();
    assert!(!calendar.dates_set(shifted).await);
}

#[tokio::test]
async fn test_new_window_fetches_again() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 2);
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    let april = DateRange::parse("2025-04-01T00:00:00Z", "2025-05-01T00:00:00Z").unwrap();
    assert!(calendar.dates_set(april).await);
    assert_eq!(calendar.current_range(), Some(april));
}

#[tokio::test]
async fn test_mount_loads_current_month() {
    let mut mock = MockAppointments::new();
    mock.expect_list()
        .with(predicate::eq(march()))
        .times(1)
        .returning(|_| Ok(vec![]));
    let mut calendar = CalendarController::new(mock, RescheduleStrategy::KeepMoved);

    assert!(calendar.mount(at(17, 15)).await);
}

#[tokio::test]
async fn test_events_skip_nulls_and_records_without_id() {
    let mut mock = MockAppointments::new();
    mock.expect_list().times(1).returning(|_| {
        let mut draft = appointment(9, 12, 9);
        draft.id = None;
        Ok(vec![None, Some(appointment(1, 10, 9)), Some(draft), None])
    });
    let calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    let events = calendar.events();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "1");
    assert_eq!(events[0].title, "Ana Perez - Medical");
    assert_eq!(events[0].extended_props.pet_name.as_deref(), Some("Luna"));
    assert_eq!(events[0].extended_props.service_type, ServiceType::Medical);
}

#[tokio::test]
async fn test_load_failure_is_reported_as_blocking_error() {
    let mut mock = MockAppointments::new();
    mock.expect_list()
        .times(1)
        .returning(|_| Err(Failure::server("Database error: connection refused")));
    let calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    assert_eq!(
        calendar.blocking_error().as_deref(),
        Some("Error loading appointments: Database error: connection refused")
    );
}

#[tokio::test]
async fn test_drop_without_start_reverts_without_mutation() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_update().never();
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    let before = calendar.events();

    let outcome = calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: None,
            end: Some(at(10, 12)),
        })
        .await;

    assert_eq!(outcome, DropOutcome::Reverted);
    assert_eq!(calendar.events(), before);
    assert_eq!(calendar.notification(), None);
}

#[tokio::test]
async fn test_rejected_drop_restores_pre_drag_position() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_update()
        .times(1)
        .returning(|_, _| {
            Err(Failure::validation(
                "Validation error: Pet is not owned by the client",
            ))
        });
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    let before = event(&calendar, "1");

    let outcome = calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: Some(at(12, 9)),
            end: Some(at(12, 10)),
        })
        .await;

    assert_eq!(outcome, DropOutcome::Reverted);
    assert_eq!(event(&calendar, "1"), before);
    assert_eq!(
        calendar.notification(),
        Some(&Notification::error(
            "Failed to reschedule appointment: Validation error: Pet is not owned by the client"
        ))
    );
}

#[tokio::test]
async fn test_rejected_second_drop_returns_to_first_drop_position() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_update()
        .with(
            predicate::eq(1),
            predicate::eq(UpdateAppointmentRequest::reschedule(at(12, 9), at(12, 10))),
        )
        .times(1)
        .returning(|_, _| Ok(appointment(1, 12, 9)));
    mock.expect_update()
        .with(
            predicate::eq(1),
            predicate::eq(UpdateAppointmentRequest::reschedule(at(13, 9), at(13, 10))),
        )
        .times(1)
        .returning(|_, _| Err(Failure::server("boom")));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: Some(at(12, 9)),
            end: Some(at(12, 10)),
        })
        .await;
    calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: Some(at(13, 9)),
            end: Some(at(13, 10)),
        })
        .await;

    assert_eq!(event(&calendar, "1").start, at(12, 9));
}

#[tokio::test]
async fn test_saved_drop_keeps_moved_position() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_update()
        .with(
            predicate::eq(2),
            predicate::eq(UpdateAppointmentRequest::reschedule(at(14, 8), at(14, 9))),
        )
        .times(1)
        .returning(|_, _| Ok(appointment(2, 14, 8)));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    let outcome = calendar
        .event_drop(EventDrop {
            event_id: "2".to_string(),
            start: Some(at(14, 8)),
            end: Some(at(14, 9)),
        })
        .await;

    assert_eq!(outcome, DropOutcome::Kept);
    let moved = event(&calendar, "2");
    assert_eq!((moved.start, moved.end), (at(14, 8), at(14, 9)));
    assert_eq!(
        calendar.notification(),
        Some(&Notification::success(RESCHEDULED_MESSAGE))
    );
}

#[tokio::test]
async fn test_drop_without_end_uses_start() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_update()
        .with(
            predicate::eq(1),
            predicate::eq(UpdateAppointmentRequest::reschedule(at(15, 9), at(15, 9))),
        )
        .times(1)
        .returning(|_, _| Ok(appointment(1, 15, 9)));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    let outcome = calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: Some(at(15, 9)),
            end: None,
        })
        .await;

    assert_eq!(outcome, DropOutcome::Kept);
}

#[tokio::test]
async fn test_saved_drop_refetches_with_refetch_strategy() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 2);
    mock.expect_update()
        .times(1)
        .returning(|_, _| Ok(appointment(2, 14, 8)));
    let mut calendar = mounted(mock, RescheduleStrategy::Refetch).await;

    let outcome = calendar
        .event_drop(EventDrop {
            event_id: "2".to_string(),
            start: Some(at(14, 8)),
            end: Some(at(14, 9)),
        })
        .await;

    assert_eq!(outcome, DropOutcome::Refetched);
    // The listing still reports the stored position.
    assert_eq!(event(&calendar, "2").start, at(11, 14));
}

#[tokio::test]
async fn test_failed_refetch_keeps_saved_drop_position() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_list()
        .times(1)
        .returning(|_| Err(Failure::server("connection reset")));
    mock.expect_update()
        .times(1)
        .returning(|_, _| Ok(appointment(1, 12, 9)));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: Some(at(12, 9)),
            end: Some(at(12, 10)),
        })
        .await;
    calendar.refetch().await;

    assert!(calendar.blocking_error().is_some());
    let shown = event(&calendar, "1");
    assert_eq!((shown.start, shown.end), (at(12, 9), at(12, 10)));
}

#[tokio::test]
async fn test_event_click_opens_details() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    assert!(calendar.event_click("2"));
    assert_eq!(
        calendar.details_modal().appointment().and_then(|a| a.id),
        Some(2)
    );
    assert!(!calendar.event_click("42"));
}

#[tokio::test]
async fn test_date_click_defaults_end_to_one_hour_later() {
    let mock = MockAppointments::new();
    let mut calendar = CalendarController::new(mock, RescheduleStrategy::KeepMoved);

    calendar.date_click(at(10, 9));

    let form = calendar.create_modal().form();
    assert!(calendar.create_modal().is_open());
    assert_eq!(form.start, Some(at(10, 9)));
    assert_eq!(form.end, Some(at(10, 10)));
}

#[tokio::test]
async fn test_create_without_service_type_is_blocked() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_create().never();
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    calendar.date_click(at(10, 9));

    let outcome = calendar.submit_create().await;

    let errors = match outcome {
        SubmitOutcome::Invalid(errors) => errors,
        other => panic!("expected validation errors, got {:?}", other),
    };
    assert_eq!(
        errors.get(FormField::ServiceType),
        Some("Service type is required")
    );
    assert_eq!(
        calendar.create_modal().errors().get(FormField::ServiceType),
        Some("Service type is required")
    );
    assert!(calendar.create_modal().is_open());
}

#[tokio::test]
async fn test_successful_create_notifies_and_refetches_once() {
    let mut mock = MockAppointments::new();
    // Mount plus exactly one refetch after the modal closes.
    listing(&mut mock, 2);
    mock.expect_create()
        .withf(|draft| draft.start == at(10, 9) && draft.end == at(10, 10))
        .times(1)
        .returning(|_| Ok(appointment(3, 10, 9)));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    calendar.date_click(at(10, 9));
    calendar
        .create_modal_mut()
        .edit(|form| form.service_type = Some(ServiceType::Grooming));

    let outcome = calendar.submit_create().await;

    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert!(!calendar.create_modal().is_open());
    assert_eq!(
        calendar.notification(),
        Some(&Notification::success(CREATED_MESSAGE))
    );
}

#[tokio::test]
async fn test_failed_create_keeps_modal_open() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_create()
        .times(1)
        .returning(|_| Err(Failure::validation("Validation error: Guest name is required")));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    calendar.date_click(at(10, 9));
    calendar
        .create_modal_mut()
        .edit(|form| form.service_type = Some(ServiceType::Medical));

    calendar.submit_create().await;

    assert!(calendar.create_modal().is_open());
    assert_eq!(
        calendar.create_modal().state().error(),
        Some("Validation error: Guest name is required")
    );
    assert_eq!(
        calendar.notification().map(|n| n.level),
        Some(NotificationLevel::Error)
    );
}

#[tokio::test]
async fn test_cancelled_create_does_not_refetch() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    calendar.date_click(at(10, 9));

    calendar.cancel_create().await;

    assert!(!calendar.create_modal().is_open());
    assert_eq!(calendar.notification(), None);
}

#[tokio::test]
async fn test_details_edit_request_opens_edit_and_saves_changes() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 2);
    mock.expect_update()
        .withf(|id, patch| {
            *id == 1
                && patch.reason.as_deref() == Some("Annual checkup")
                && patch.start.is_none()
                && patch.service_type.is_none()
        })
        .times(1)
        .returning(|_, _| Ok(appointment(1, 10, 9)));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    assert!(calendar.event_click("1"));
    assert!(calendar.request_edit());
    assert!(!calendar.details_modal().is_open());
    assert!(calendar.edit_modal().is_open());
    assert_eq!(calendar.edit_modal().form().start, Some(at(10, 9)));

    calendar
        .edit_modal_mut()
        .edit(|form| form.reason = "Annual checkup".to_string());
    let outcome = calendar.submit_edit().await;

    assert!(matches!(outcome, SubmitOutcome::Saved(_)));
    assert_eq!(
        calendar.notification(),
        Some(&Notification::success(UPDATED_MESSAGE))
    );
}

#[tokio::test]
async fn test_delete_request_closes_details_without_mutation() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_delete().never();
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;
    calendar.event_click("1");

    calendar.request_delete();

    assert!(!calendar.details_modal().is_open());
}

#[tokio::test]
async fn test_weekends_toggle_and_notification_dismiss() {
    let mut mock = MockAppointments::new();
    listing(&mut mock, 1);
    mock.expect_update()
        .times(1)
        .returning(|_, _| Ok(appointment(1, 12, 9)));
    let mut calendar = mounted(mock, RescheduleStrategy::KeepMoved).await;

    assert!(calendar.weekends_visible());
    assert!(!calendar.toggle_weekends());
    assert!(calendar.toggle_weekends());

    calendar
        .event_drop(EventDrop {
            event_id: "1".to_string(),
            start: Some(at(12, 9)),
            end: Some(at(12, 10)),
        })
        .await;
    assert!(calendar.notification().is_some());
    calendar.dismiss_notification();
    assert_eq!(calendar.notification(), None);
}
