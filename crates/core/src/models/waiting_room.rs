//! Walk-in queue of patients waiting for a consultation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ClinicError, ClinicResult};

wire_enum! {
    pub enum WaitingStatus {
        Waiting => ("WAITING", "Waiting"),
        InConsultation => ("IN_CONSULTATION", "In consultation"),
        Completed => ("COMPLETED", "Completed"),
        Cancelled => ("CANCELLED", "Cancelled"),
    }
}

impl Default for WaitingStatus {
    fn default() -> Self {
        WaitingStatus::Waiting
    }
}

wire_enum! {
    /// How soon a patient must be seen. Higher priorities are served first.
    pub enum Priority {
        Normal => ("NORMAL", "Normal"),
        Urgent => ("URGENT", "Urgent"),
        Emergency => ("EMERGENCY", "Emergency"),
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Normal => 1,
            Priority::Urgent => 2,
            Priority::Emergency => 3,
        }
    }
}

/// A step of an entry through the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    StartConsultation,
    Complete,
    Cancel,
}

impl WaitingStatus {
    /// Entries still occupying the waiting room.
    pub fn is_active(&self) -> bool {
        matches!(self, WaitingStatus::Waiting | WaitingStatus::InConsultation)
    }

    /// Status after `action`, or a conflict when the entry is not in a state
    /// that allows it.
    pub fn apply(self, action: QueueAction) -> ClinicResult<WaitingStatus> {
        match (self, action) {
            (WaitingStatus::Waiting, QueueAction::StartConsultation) => {
                Ok(WaitingStatus::InConsultation)
            }
            (WaitingStatus::InConsultation, QueueAction::Complete) => Ok(WaitingStatus::Completed),
            (WaitingStatus::Waiting | WaitingStatus::InConsultation, QueueAction::Cancel) => {
                Ok(WaitingStatus::Cancelled)
            }
            (_, QueueAction::StartConsultation) => Err(ClinicError::Conflict(
                "Only waiting entries can move to consultation".to_string(),
            )),
            (_, QueueAction::Complete) => Err(ClinicError::Conflict(
                "Only entries in consultation can be completed".to_string(),
            )),
            (_, QueueAction::Cancel) => Err(ClinicError::Conflict(
                "Completed or cancelled entries cannot be cancelled".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingRoomEntry {
    pub id: Option<i64>,
    pub client_id: i64,
    pub pet_id: i64,
    pub client_name: Option<String>,
    pub pet_name: Option<String>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default)]
    pub status: WaitingStatus,
    #[serde(default)]
    pub priority: Priority,
    pub reason_for_visit: Option<String>,
    pub notes: Option<String>,
    pub consultation_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WaitingRoomEntry {
    /// Whole minutes between arrival and `now`, never negative.
    pub fn wait_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.arrival_time).num_minutes().max(0)
    }

    /// `"25 min"` under an hour, `"1h 5m"` from then on.
    pub fn wait_label(&self, now: DateTime<Utc>) -> String {
        let minutes = self.wait_minutes(now);
        if minutes < 60 {
            format!("{} min", minutes)
        } else {
            format!("{}h {}m", minutes / 60, minutes % 60)
        }
    }
}

/// Order in which the queue is served: priority first, then arrival.
pub fn sort_queue(entries: &mut [WaitingRoomEntry]) {
    entries.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then(a.arrival_time.cmp(&b.arrival_time))
    });
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToWaitingRoomRequest {
    pub client_id: i64,
    pub pet_id: i64,
    pub reason_for_visit: String,
    #[serde(default)]
    pub priority: Priority,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePriorityRequest {
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEntryRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingRoomStats {
    pub waiting: i64,
    pub in_consultation: i64,
    pub today_total: i64,
}

/// Notes after cancelling at `at` for `reason`.
pub fn notes_after_queue_cancellation(
    notes: Option<&str>,
    reason: &str,
    at: DateTime<Utc>,
) -> String {
    let line = format!("Cancelled at {}: {}", at.format("%Y-%m-%d %H:%M"), reason.trim());
    match notes.filter(|n| !n.trim().is_empty()) {
        Some(current) => format!("{current}\n{line}"),
        None => line,
    }
}
