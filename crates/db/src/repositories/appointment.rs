use crate::models::DbAppointment;
use chrono::Utc;
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use vetclinic_core::models::{
    appointment::{
        Appointment, AppointmentStatus, ClearableField, CreateAppointmentRequest,
        UpdateAppointmentRequest, notes_after_cancellation,
    },
    calendar::DateRange,
};

const APPOINTMENT_SELECT: &str = r#"
    SELECT a.id, a.start_at, a.end_at, a.service_type, a.status, a.reason, a.notes,
           a.client_id, a.pet_id, a.employee_id,
           a.guest_name, a.guest_phone, a.guest_pet_type, a.guest_breed, a.guest_email,
           c.first_name AS client_first_name, c.last_name AS client_last_name,
           c.phone AS client_phone,
           p.name AS pet_name, p.breed AS pet_breed,
           e.first_name AS employee_first_name, e.last_name AS employee_last_name,
           a.created_at, a.updated_at
    FROM appointments a
    LEFT JOIN clients c ON c.id = a.client_id
    LEFT JOIN pets p ON p.id = a.pet_id
    LEFT JOIN employees e ON e.id = a.employee_id
"#;

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    request: &CreateAppointmentRequest,
) -> Result<Appointment> {
    let now = Utc::now();
    let status = request.status.unwrap_or_default();
    let guest = request.guest_client.as_ref();

    tracing::debug!(
        "Creating appointment: start={}, end={}, service_type={}, client_id={:?}",
        request.start, request.end, request.service_type, request.client_id
    );

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO appointments (
            start_at, end_at, service_type, status, reason, notes,
            client_id, pet_id, employee_id,
            guest_name, guest_phone, guest_pet_type, guest_breed, guest_email,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(request.start)
    .bind(request.end)
    .bind(request.service_type.as_str())
    .bind(status.as_str())
    .bind(request.reason.as_deref())
    .bind(request.notes.as_deref())
    .bind(request.client_id)
    .bind(request.pet_id)
    .bind(request.employee_id)
    .bind(guest.map(|g| g.name.as_str()))
    .bind(guest.and_then(|g| g.phone.as_deref()))
    .bind(guest.and_then(|g| g.pet_type).map(|t| t.as_str()))
    .bind(guest.and_then(|g| g.breed.as_deref()))
    .bind(guest.and_then(|g| g.email.as_deref()))
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created appointment with ID: {}", id);

    get_appointment_by_id(pool, id)
        .await?
        .ok_or_else(|| eyre!("Appointment {} vanished after insert", id))
}

pub async fn get_appointment_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<Appointment>> {
    tracing::debug!("Getting appointment by id: {}", id);

    let row = sqlx::query_as::<_, DbAppointment>(&format!("{APPOINTMENT_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(DbAppointment::into_domain).transpose()
}

/// Appointments whose start falls inside `range`, or every appointment when
/// no range is given.
pub async fn list_appointments(
    pool: &Pool<Postgres>,
    range: Option<DateRange>,
) -> Result<Vec<Appointment>> {
    let rows = match range {
        Some(range) => {
            tracing::debug!("Listing appointments between {} and {}", range.start, range.end);
            sqlx::query_as::<_, DbAppointment>(&format!(
                "{APPOINTMENT_SELECT} WHERE a.start_at >= $1 AND a.start_at < $2 ORDER BY a.start_at ASC"
            ))
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?
        }
        None => {
            tracing::debug!("Listing all appointments");
            sqlx::query_as::<_, DbAppointment>(&format!(
                "{APPOINTMENT_SELECT} ORDER BY a.start_at ASC"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    rows.into_iter().map(DbAppointment::into_domain).collect()
}

/// Applies a partial update; columns whose field is `None` keep their value
/// and columns named in `request.clear` become NULL.
pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: i64,
    request: &UpdateAppointmentRequest,
) -> Result<Appointment> {
    let now = Utc::now();
    let guest = request.guest_client.as_ref();
    let replaces_guest = guest.is_some() || request.clears(ClearableField::GuestClient);

    tracing::debug!(
        "Updating appointment with ID: {} (clearing {:?})",
        id, request.clear
    );

    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET start_at = COALESCE($2, start_at),
            end_at = COALESCE($3, end_at),
            service_type = COALESCE($4, service_type),
            status = COALESCE($5, status),
            reason = CASE WHEN $18 THEN NULL ELSE COALESCE($6, reason) END,
            notes = CASE WHEN $19 THEN NULL ELSE COALESCE($7, notes) END,
            client_id = CASE WHEN $20 THEN NULL ELSE COALESCE($8, client_id) END,
            pet_id = CASE WHEN $21 THEN NULL ELSE COALESCE($9, pet_id) END,
            employee_id = CASE WHEN $22 THEN NULL ELSE COALESCE($10, employee_id) END,
            guest_name = CASE WHEN $11 THEN $12 ELSE guest_name END,
            guest_phone = CASE WHEN $11 THEN $13 ELSE guest_phone END,
            guest_pet_type = CASE WHEN $11 THEN $14 ELSE guest_pet_type END,
            guest_breed = CASE WHEN $11 THEN $15 ELSE guest_breed END,
            guest_email = CASE WHEN $11 THEN $16 ELSE guest_email END,
            updated_at = $17
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(request.start)
    .bind(request.end)
    .bind(request.service_type.map(|s| s.as_str()))
    .bind(request.status.map(|s| s.as_str()))
    .bind(request.reason.as_deref())
    .bind(request.notes.as_deref())
    .bind(request.client_id)
    .bind(request.pet_id)
    .bind(request.employee_id)
    .bind(replaces_guest)
    .bind(guest.map(|g| g.name.as_str()))
    .bind(guest.and_then(|g| g.phone.as_deref()))
    .bind(guest.and_then(|g| g.pet_type).map(|t| t.as_str()))
    .bind(guest.and_then(|g| g.breed.as_deref()))
    .bind(guest.and_then(|g| g.email.as_deref()))
    .bind(now)
    .bind(request.clears(ClearableField::Reason))
    .bind(request.clears(ClearableField::Notes))
    .bind(request.clears(ClearableField::Client))
    .bind(request.clears(ClearableField::Pet))
    .bind(request.clears(ClearableField::Employee))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(eyre!("Appointment not found"));
    }

    tracing::info!("Updated appointment with ID: {}", id);

    get_appointment_by_id(pool, id)
        .await?
        .ok_or_else(|| eyre!("Appointment not found"))
}

pub async fn change_status(
    pool: &Pool<Postgres>,
    id: i64,
    status: AppointmentStatus,
) -> Result<Appointment> {
    tracing::debug!("Changing status of appointment {} to {}", id, status);

    let request = UpdateAppointmentRequest {
        status: Some(status),
        ..UpdateAppointmentRequest::default()
    };
    let appointment = update_appointment(pool, id, &request).await?;

    tracing::info!("Changed status of appointment {} to {}", id, status);
    Ok(appointment)
}

/// Marks the appointment cancelled and records the reason in its notes.
pub async fn cancel_appointment(
    pool: &Pool<Postgres>,
    id: i64,
    reason: Option<&str>,
) -> Result<Appointment> {
    tracing::debug!("Cancelling appointment with ID: {}", id);

    let current = get_appointment_by_id(pool, id)
        .await?
        .ok_or_else(|| eyre!("Appointment not found"))?;

    let request = UpdateAppointmentRequest {
        status: Some(AppointmentStatus::Cancelled),
        notes: notes_after_cancellation(current.notes.as_deref(), reason),
        ..UpdateAppointmentRequest::default()
    };
    let appointment = update_appointment(pool, id, &request).await?;

    tracing::info!("Cancelled appointment with ID: {}", id);
    Ok(appointment)
}

/// Returns `false` when there was nothing to delete.
pub async fn delete_appointment(pool: &Pool<Postgres>, id: i64) -> Result<bool> {
    tracing::debug!("Deleting appointment with ID: {}", id);

    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!("Deleted appointment with ID: {}", id);
    }
    Ok(deleted)
}
