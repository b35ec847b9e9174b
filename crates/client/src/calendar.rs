//! Calendar view controller.
//!
//! Owns the visible date range and the appointment list for it, projects
//! appointments into calendar events and routes clicks, drags and modal
//! results. Every entry point takes `&mut self`; one interaction finishes
//! before the next starts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vetclinic_core::models::{
    appointment::{Appointment, CreateAppointmentRequest, ServiceType, UpdateAppointmentRequest},
    calendar::DateRange,
};

use crate::{
    config::RescheduleStrategy,
    gateway::EntityService,
    list::{EntityList, ListState, RefetchOutcome},
    modal::{CreateAppointmentModal, DetailsModal, EditAppointmentModal, SubmitOutcome},
    notification::Notification,
};

pub const CREATED_MESSAGE: &str = "Appointment created successfully.";
pub const UPDATED_MESSAGE: &str = "Appointment updated successfully.";
pub const RESCHEDULED_MESSAGE: &str = "Appointment rescheduled successfully.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedProps {
    pub pet_name: Option<String>,
    pub service_type: ServiceType,
}

/// What the calendar widget renders for one appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub extended_props: ExtendedProps,
}

impl CalendarEvent {
    /// `None` for records the service has not assigned an id yet.
    pub fn from_appointment(appointment: &Appointment) -> Option<Self> {
        Some(Self {
            id: appointment.id?.to_string(),
            title: appointment.title.clone(),
            start: appointment.start,
            end: appointment.end,
            extended_props: ExtendedProps {
                pet_name: appointment.pet_name.clone(),
                service_type: appointment.service_type,
            },
        })
    }
}

pub fn project_events(appointments: &[Appointment]) -> Vec<CalendarEvent> {
    appointments
        .iter()
        .filter_map(CalendarEvent::from_appointment)
        .collect()
}

/// Last window reported by the calendar widget, kept in normalized form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTracker {
    last: Option<(String, String)>,
    current: Option<DateRange>,
}

impl RangeTracker {
    /// Records `range`; `true` when it differs from the previous report.
    pub fn observe(&mut self, range: DateRange) -> bool {
        let key = range.normalized();
        if self.last.as_ref() == Some(&key) {
            return false;
        }
        self.last = Some(key);
        self.current = Some(range);
        true
    }

    pub fn current(&self) -> Option<DateRange> {
        self.current
    }
}

/// A drag that ended somewhere on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDrop {
    pub event_id: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The event went back to where it was before the drag.
    Reverted,
    /// Saved; the calendar keeps showing the moved position.
    Kept,
    /// Saved; the range was loaded again.
    Refetched,
}

pub struct CalendarController<S>
where
    S: EntityService<
            Record = Appointment,
            Filter = DateRange,
            Draft = CreateAppointmentRequest,
            Patch = UpdateAppointmentRequest,
        >,
{
    appointments: EntityList<S>,
    range: RangeTracker,
    strategy: RescheduleStrategy,
    /// Positions shown for dragged events until a refetch succeeds.
    moved: HashMap<String, (DateTime<Utc>, DateTime<Utc>)>,
    weekends_visible: bool,
    notification: Option<Notification>,
    create_modal: CreateAppointmentModal,
    edit_modal: EditAppointmentModal,
    details_modal: DetailsModal,
}

impl<S> CalendarController<S>
where
    S: EntityService<
            Record = Appointment,
            Filter = DateRange,
            Draft = CreateAppointmentRequest,
            Patch = UpdateAppointmentRequest,
        >,
{
    pub fn new(service: S, strategy: RescheduleStrategy) -> Self {
        Self::with_list(EntityList::new(service), strategy)
    }

    pub fn with_list(appointments: EntityList<S>, strategy: RescheduleStrategy) -> Self {
        Self {
            appointments,
            range: RangeTracker::default(),
            strategy,
            moved: HashMap::new(),
            weekends_visible: true,
            notification: None,
            create_modal: CreateAppointmentModal::new(),
            edit_modal: EditAppointmentModal::new(),
            details_modal: DetailsModal::default(),
        }
    }

    /// Loads the calendar month containing `now`.
    pub async fn mount(&mut self, now: DateTime<Utc>) -> bool {
        self.dates_set(DateRange::month_of(now)).await
    }

    /// Handles a window reported by the calendar widget. Refetches only
    /// when the window differs from the last one seen.
    pub async fn dates_set(&mut self, range: DateRange) -> bool {
        if !self.range.observe(range) {
            return false;
        }
        tracing::debug!("Visible range changed to {:?}", range.normalized());
        self.refetch().await;
        true
    }

    /// Same as [`dates_set`](Self::dates_set) for a window reported as text.
    pub async fn dates_set_str(&mut self, start: &str, end: &str) -> Result<bool, chrono::ParseError> {
        let range = DateRange::parse(start, end)?;
        Ok(self.dates_set(range).await)
    }

    pub fn current_range(&self) -> Option<DateRange> {
        self.range.current()
    }

    /// Reloads the current range; a no-op before any range was reported.
    ///
    /// Dragged positions are dropped only once fresh data replaced them.
    pub async fn refetch(&mut self) {
        let Some(range) = self.range.current() else {
            return;
        };
        let outcome = self.appointments.refetch(&range).await;
        if outcome == RefetchOutcome::Applied && self.appointments.snapshot().error.is_none() {
            self.moved.clear();
        }
    }

    pub fn list(&self) -> &EntityList<S> {
        &self.appointments
    }

    pub fn state(&self) -> ListState<Appointment> {
        self.appointments.snapshot()
    }

    /// Message shown instead of the calendar when loading failed.
    pub fn blocking_error(&self) -> Option<String> {
        self.state()
            .error
            .map(|message| format!("Error loading appointments: {}", message))
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        let mut events = project_events(&self.state().data);
        for event in &mut events {
            if let Some((start, end)) = self.moved.get(&event.id) {
                event.start = *start;
                event.end = *end;
            }
        }
        events
    }

    fn find_appointment(&self, event_id: &str) -> Option<Appointment> {
        self.state()
            .data
            .into_iter()
            .find(|a| a.id.map(|id| id.to_string()).as_deref() == Some(event_id))
    }

    /// Opens the details modal for the clicked event.
    pub fn event_click(&mut self, event_id: &str) -> bool {
        match self.find_appointment(event_id) {
            Some(appointment) => {
                self.details_modal.open(appointment);
                true
            }
            None => {
                tracing::debug!("Clicked event {} is not in the current list", event_id);
                false
            }
        }
    }

    /// Opens the create modal starting at the clicked instant.
    pub fn date_click(&mut self, instant: DateTime<Utc>) {
        self.create_modal.open(Some(instant));
    }

    pub async fn event_drop(&mut self, drop: EventDrop) -> DropOutcome {
        // Reverting leaves `moved` as it was before the drag.
        let Some(start) = drop.start else {
            tracing::debug!("Drop of event {} has no start; reverting", drop.event_id);
            return DropOutcome::Reverted;
        };
        let end = drop.end.unwrap_or(start);
        let Ok(id) = drop.event_id.parse::<i64>() else {
            tracing::warn!("Dropped event has a non-numeric id: {}", drop.event_id);
            return DropOutcome::Reverted;
        };

        let previous = self.moved.insert(drop.event_id.clone(), (start, end));

        let patch = UpdateAppointmentRequest::reschedule(start, end);
        match self.appointments.service().update(id, patch).await {
            Ok(_) => {
                self.notify(Notification::success(RESCHEDULED_MESSAGE));
                match self.strategy {
                    RescheduleStrategy::KeepMoved => DropOutcome::Kept,
                    RescheduleStrategy::Refetch => {
                        self.refetch().await;
                        DropOutcome::Refetched
                    }
                }
            }
            Err(failure) => {
                tracing::error!("Error rescheduling appointment {}: {}", id, failure);
                match previous {
                    Some(position) => self.moved.insert(drop.event_id, position),
                    None => self.moved.remove(&drop.event_id),
                };
                self.notify(Notification::error(format!(
                    "Failed to reschedule appointment: {}",
                    failure.message
                )));
                DropOutcome::Reverted
            }
        }
    }

    pub fn create_modal(&self) -> &CreateAppointmentModal {
        &self.create_modal
    }

    pub fn create_modal_mut(&mut self) -> &mut CreateAppointmentModal {
        &mut self.create_modal
    }

    pub fn edit_modal(&self) -> &EditAppointmentModal {
        &self.edit_modal
    }

    pub fn edit_modal_mut(&mut self) -> &mut EditAppointmentModal {
        &mut self.edit_modal
    }

    pub fn details_modal(&self) -> &DetailsModal {
        &self.details_modal
    }

    pub async fn submit_create(&mut self) -> SubmitOutcome {
        let outcome = self.create_modal.submit(self.appointments.service()).await;
        match &outcome {
            SubmitOutcome::Saved(_) => self.create_closed(true).await,
            SubmitOutcome::Failed(failure) => self.notify(Notification::error(format!(
                "Failed to create appointment: {}",
                failure.message
            ))),
            _ => {}
        }
        outcome
    }

    pub async fn cancel_create(&mut self) {
        let success = self.create_modal.cancel();
        self.create_closed(success).await;
    }

    async fn create_closed(&mut self, success: bool) {
        if success {
            self.notify(Notification::success(CREATED_MESSAGE));
            self.refetch().await;
        }
    }

    pub async fn submit_edit(&mut self) -> SubmitOutcome {
        let outcome = self.edit_modal.submit(self.appointments.service()).await;
        match &outcome {
            SubmitOutcome::Saved(_) => self.edit_closed(true).await,
            SubmitOutcome::Failed(failure) => self.notify(Notification::error(format!(
                "Failed to update appointment: {}",
                failure.message
            ))),
            _ => {}
        }
        outcome
    }

    pub async fn cancel_edit(&mut self) {
        let success = self.edit_modal.cancel();
        self.edit_closed(success).await;
    }

    async fn edit_closed(&mut self, success: bool) {
        if success {
            self.notify(Notification::success(UPDATED_MESSAGE));
            self.refetch().await;
        }
    }

    pub fn close_details(&mut self) {
        self.details_modal.close();
    }

    /// Moves from the details modal to the edit modal for the same record.
    pub fn request_edit(&mut self) -> bool {
        match self.details_modal.request_edit() {
            Some(appointment) => self.edit_modal.open(appointment),
            None => false,
        }
    }

    pub fn request_delete(&mut self) {
        self.details_modal.request_delete();
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn toggle_weekends(&mut self) -> bool {
        self.weekends_visible = !self.weekends_visible;
        self.weekends_visible
    }

    pub fn weekends_visible(&self) -> bool {
        self.weekends_visible
    }
}
