use crate::{models::DbClient, repositories::contains_pattern};
use eyre::Result;
use sqlx::{Pool, Postgres};
use vetclinic_core::models::client::Client;

/// Active clients, optionally narrowed by a case-insensitive match on name,
/// phone or email.
pub async fn list_clients(pool: &Pool<Postgres>, search: Option<&str>) -> Result<Vec<Client>> {
    let term = search.map(str::trim).filter(|s| !s.is_empty());
    tracing::debug!("Listing clients, search={:?}", term);

    let rows = sqlx::query_as::<_, DbClient>(
        r#"
        SELECT id, first_name, last_name, phone, email, created_at
        FROM clients
        WHERE active = TRUE
          AND ($1::TEXT IS NULL
               OR first_name ILIKE $1 ESCAPE '\'
               OR last_name ILIKE $1 ESCAPE '\'
               OR (first_name || ' ' || last_name) ILIKE $1 ESCAPE '\'
               OR phone ILIKE $1 ESCAPE '\'
               OR email ILIKE $1 ESCAPE '\')
        ORDER BY last_name ASC, first_name ASC
        "#,
    )
    .bind(term.map(contains_pattern))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Client::from).collect())
}

pub async fn get_client_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<Client>> {
    let row = sqlx::query_as::<_, DbClient>(
        r#"
        SELECT id, first_name, last_name, phone, email, created_at
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Client::from))
}
