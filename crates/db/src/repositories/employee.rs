use crate::models::DbEmployee;
use eyre::Result;
use sqlx::{Pool, Postgres};
use vetclinic_core::models::employee::Employee;

pub async fn list_employees(pool: &Pool<Postgres>) -> Result<Vec<Employee>> {
    tracing::debug!("Listing active employees");

    let rows = sqlx::query_as::<_, DbEmployee>(
        r#"
        SELECT id, first_name, last_name, role, active
        FROM employees
        WHERE active = TRUE
        ORDER BY last_name ASC, first_name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DbEmployee::into_domain).collect()
}

pub async fn get_employee_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<Employee>> {
    let row = sqlx::query_as::<_, DbEmployee>(
        r#"
        SELECT id, first_name, last_name, role, active
        FROM employees
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(DbEmployee::into_domain).transpose()
}
