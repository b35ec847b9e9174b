use crate::models::DbWaitingRoomEntry;
use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use sqlx::{Pool, Postgres};
use vetclinic_core::models::{
    calendar::DateRange,
    waiting_room::{AddToWaitingRoomRequest, Priority, WaitingRoomEntry, WaitingRoomStats, WaitingStatus},
};

const ENTRY_SELECT: &str = r#"
    SELECT w.id, w.client_id, w.pet_id,
           c.first_name AS client_first_name, c.last_name AS client_last_name,
           p.name AS pet_name,
           w.arrival_time, w.status, w.priority, w.reason_for_visit, w.notes,
           w.consultation_started_at, w.completed_at
    FROM waiting_room w
    LEFT JOIN clients c ON c.id = w.client_id
    LEFT JOIN pets p ON p.id = w.pet_id
"#;

/// Status change applied by [`transition_entry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: WaitingStatus,
    pub to: WaitingStatus,
    /// Replaces the stored notes when set.
    pub notes: Option<String>,
    pub at: DateTime<Utc>,
}

pub async fn add_entry(
    pool: &Pool<Postgres>,
    request: &AddToWaitingRoomRequest,
    arrival_time: DateTime<Utc>,
) -> Result<WaitingRoomEntry> {
    tracing::debug!(
        "Adding pet {} of client {} to the waiting room ({})",
        request.pet_id, request.client_id, request.priority
    );

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO waiting_room (
            client_id, pet_id, arrival_time, status, priority, reason_for_visit, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(request.client_id)
    .bind(request.pet_id)
    .bind(arrival_time)
    .bind(WaitingStatus::Waiting.as_str())
    .bind(request.priority.as_str())
    .bind(request.reason_for_visit.trim())
    .bind(&request.notes)
    .fetch_one(pool)
    .await?;

    get_entry(pool, id)
        .await?
        .ok_or_else(|| eyre!("Waiting room entry {} vanished after insert", id))
}

pub async fn get_entry(pool: &Pool<Postgres>, id: i64) -> Result<Option<WaitingRoomEntry>> {
    let row = sqlx::query_as::<_, DbWaitingRoomEntry>(&format!("{ENTRY_SELECT} WHERE w.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(DbWaitingRoomEntry::into_domain).transpose()
}

/// Whether the pet already waits or is being seen.
pub async fn has_active_entry(pool: &Pool<Postgres>, pet_id: i64) -> Result<bool> {
    let active = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM waiting_room
            WHERE pet_id = $1 AND status IN ($2, $3)
        )
        "#,
    )
    .bind(pet_id)
    .bind(WaitingStatus::Waiting.as_str())
    .bind(WaitingStatus::InConsultation.as_str())
    .fetch_one(pool)
    .await?;

    Ok(active)
}

/// Entries waiting or in consultation, highest priority first, then by
/// arrival.
pub async fn list_current(pool: &Pool<Postgres>) -> Result<Vec<WaitingRoomEntry>> {
    let rows = sqlx::query_as::<_, DbWaitingRoomEntry>(&format!(
        "{ENTRY_SELECT}
         WHERE w.status IN ($1, $2)
         ORDER BY CASE w.priority
                      WHEN $3 THEN 3
                      WHEN $4 THEN 2
                      ELSE 1
                  END DESC,
                  w.arrival_time ASC"
    ))
    .bind(WaitingStatus::Waiting.as_str())
    .bind(WaitingStatus::InConsultation.as_str())
    .bind(Priority::Emergency.as_str())
    .bind(Priority::Urgent.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DbWaitingRoomEntry::into_domain).collect()
}

/// Moves an entry from `transition.from` to `transition.to`. Returns `None`
/// when the entry is gone or no longer in `transition.from`.
pub async fn transition_entry(
    pool: &Pool<Postgres>,
    id: i64,
    transition: &Transition,
) -> Result<Option<WaitingRoomEntry>> {
    tracing::debug!(
        "Moving waiting room entry {} from {} to {}",
        id, transition.from, transition.to
    );

    let started_at = (transition.to == WaitingStatus::InConsultation).then_some(transition.at);
    let finished_at = (!transition.to.is_active()).then_some(transition.at);

    let updated = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE waiting_room SET
            status = $3,
            notes = COALESCE($4, notes),
            consultation_started_at = COALESCE($5, consultation_started_at),
            completed_at = COALESCE($6, completed_at)
        WHERE id = $1 AND status = $2
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(transition.from.as_str())
    .bind(transition.to.as_str())
    .bind(&transition.notes)
    .bind(started_at)
    .bind(finished_at)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(id) => get_entry(pool, id).await,
        None => Ok(None),
    }
}

pub async fn update_priority(
    pool: &Pool<Postgres>,
    id: i64,
    priority: Priority,
) -> Result<Option<WaitingRoomEntry>> {
    let updated = sqlx::query_scalar::<_, i64>(
        "UPDATE waiting_room SET priority = $2 WHERE id = $1 RETURNING id",
    )
    .bind(id)
    .bind(priority.as_str())
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(id) => get_entry(pool, id).await,
        None => Ok(None),
    }
}

/// Current head counts plus every arrival within `today`.
pub async fn stats(pool: &Pool<Postgres>, today: DateRange) -> Result<WaitingRoomStats> {
    let (waiting, in_consultation, today_total) = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT COUNT(*) FILTER (WHERE status = $1),
               COUNT(*) FILTER (WHERE status = $2),
               COUNT(*) FILTER (WHERE arrival_time >= $3 AND arrival_time < $4)
        FROM waiting_room
        "#,
    )
    .bind(WaitingStatus::Waiting.as_str())
    .bind(WaitingStatus::InConsultation.as_str())
    .bind(today.start)
    .bind(today.end)
    .fetch_one(pool)
    .await?;

    Ok(WaitingRoomStats {
        waiting,
        in_consultation,
        today_total,
    })
}
