//! Live view of the walk-in queue.
//!
//! The controller keeps the current entries and the day's counts, runs the
//! queue actions against the service and reloads both after each one. A
//! background task can keep the list fresh while the view is open.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle};
use vetclinic_core::{
    errors::Failure,
    models::waiting_room::{AddToWaitingRoomRequest, Priority, WaitingRoomEntry, WaitingRoomStats},
};

use crate::{
    gateway::QueueService,
    list::{EntityList, ListState},
    notification::Notification,
};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const MISSING_REASON_MESSAGE: &str = "Please provide a reason for cancellation";

/// Form for adding a walk-in patient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueDraft {
    pub client_id: Option<i64>,
    pub pet_id: Option<i64>,
    pub reason_for_visit: String,
    pub priority: Priority,
    pub notes: String,
}

impl QueueDraft {
    /// The request to send, or `None` while a required field is missing.
    pub fn to_request(&self) -> Option<AddToWaitingRoomRequest> {
        let reason = self.reason_for_visit.trim();
        if reason.is_empty() {
            return None;
        }
        let notes = self.notes.trim();
        Some(AddToWaitingRoomRequest {
            client_id: self.client_id?,
            pet_id: self.pet_id?,
            reason_for_visit: reason.to_string(),
            priority: self.priority,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

pub struct WaitingRoomController<Q: QueueService> {
    entries: EntityList<Q>,
    stats: Arc<watch::Sender<WaitingRoomStats>>,
    notification: Option<Notification>,
}

impl<Q: QueueService> WaitingRoomController<Q> {
    pub fn new(service: Q) -> Self {
        let (stats, _) = watch::channel(WaitingRoomStats::default());
        Self {
            entries: EntityList::new(service),
            stats: Arc::new(stats),
            notification: None,
        }
    }

    pub fn entries(&self) -> ListState<WaitingRoomEntry> {
        self.entries.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<WaitingRoomEntry>> {
        self.entries.subscribe()
    }

    pub fn stats(&self) -> WaitingRoomStats {
        *self.stats.borrow()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// `(entry, wait label)` rows in serving order.
    pub fn rows(&self, now: DateTime<Utc>) -> Vec<(WaitingRoomEntry, String)> {
        self.entries
            .snapshot()
            .data
            .into_iter()
            .map(|entry| {
                let label = entry.wait_label(now);
                (entry, label)
            })
            .collect()
    }

    pub async fn refresh(&self) {
        reload(&self.entries, &self.stats).await;
    }

    /// Reloads the queue every `period` until `shutdown` flips to `true` or
    /// its sender is dropped.
    pub fn spawn_polling(&self, period: Duration, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
    where
        Q: 'static,
    {
        let entries = self.entries.clone();
        let stats = Arc::clone(&self.stats);
        tokio::spawn(poll(entries, stats, period, shutdown))
    }

    /// Adds the drafted patient. Returns the new entry.
    pub async fn add(&mut self, draft: &QueueDraft) -> Option<WaitingRoomEntry> {
        let Some(request) = draft.to_request() else {
            self.notification = Some(Notification::error(MISSING_FIELDS_MESSAGE));
            return None;
        };
        let result = self.entries.service().add(request).await;
        self.finish(result, "Patient added to waiting room", "adding to waiting room")
            .await
    }

    pub async fn start_consultation(&mut self, id: i64) -> Option<WaitingRoomEntry> {
        let result = self.entries.service().start_consultation(id).await;
        self.finish(result, "Consultation started", "starting consultation")
            .await
    }

    pub async fn complete_consultation(&mut self, id: i64) -> Option<WaitingRoomEntry> {
        let result = self.entries.service().complete_consultation(id).await;
        self.finish(result, "Consultation completed", "completing consultation")
            .await
    }

    /// Cancels an entry. A blank reason is rejected without calling the
    /// service.
    pub async fn cancel(&mut self, id: i64, reason: &str) -> Option<WaitingRoomEntry> {
        let reason = reason.trim();
        if reason.is_empty() {
            self.notification = Some(Notification::error(MISSING_REASON_MESSAGE));
            return None;
        }
        let result = self.entries.service().cancel(id, reason.to_string()).await;
        self.finish(result, "Entry cancelled", "cancelling entry").await
    }

    pub async fn change_priority(&mut self, id: i64, priority: Priority) -> Option<WaitingRoomEntry> {
        let result = self.entries.service().update_priority(id, priority).await;
        self.finish(result, "Priority updated", "updating priority").await
    }

    async fn finish(
        &mut self,
        result: Result<WaitingRoomEntry, Failure>,
        success: &str,
        action: &str,
    ) -> Option<WaitingRoomEntry> {
        match result {
            Ok(entry) => {
                tracing::info!("Waiting room entry {:?}: {}", entry.id, success);
                self.notification = Some(Notification::success(success));
                self.refresh().await;
                Some(entry)
            }
            Err(failure) => {
                tracing::error!("Error {}: {}", action, failure);
                self.notification = Some(Notification::error(format!(
                    "Error {}: {}",
                    action, failure.message
                )));
                None
            }
        }
    }
}

async fn reload<Q: QueueService>(entries: &EntityList<Q>, stats: &watch::Sender<WaitingRoomStats>) {
    entries.refetch(&()).await;
    match entries.service().stats().await {
        Ok(current) => {
            stats.send_replace(current);
        }
        Err(failure) => tracing::warn!("Failed to load waiting room stats: {}", failure),
    }
}

async fn poll<Q: QueueService>(
    entries: EntityList<Q>,
    stats: Arc<watch::Sender<WaitingRoomStats>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = interval.tick() => reload(&entries, &stats).await,
        }
    }
    tracing::debug!("Waiting room polling stopped");
}
