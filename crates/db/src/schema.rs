use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create clients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id BIGSERIAL PRIMARY KEY,
            first_name VARCHAR(100) NOT NULL,
            last_name VARCHAR(100) NOT NULL,
            phone VARCHAR(15) NULL,
            email VARCHAR(100) NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create pets table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pets (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            pet_type VARCHAR(20) NOT NULL,
            breed VARCHAR(100) NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create pet_owners table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pet_owners (
            pet_id BIGINT NOT NULL REFERENCES pets(id),
            client_id BIGINT NOT NULL REFERENCES clients(id),
            PRIMARY KEY (pet_id, client_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create employees table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id BIGSERIAL PRIMARY KEY,
            first_name VARCHAR(100) NOT NULL,
            last_name VARCHAR(100) NOT NULL,
            role VARCHAR(30) NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id BIGSERIAL PRIMARY KEY,
            start_at TIMESTAMP WITH TIME ZONE NOT NULL,
            end_at TIMESTAMP WITH TIME ZONE NOT NULL,
            service_type VARCHAR(20) NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'SCHEDULED',
            reason VARCHAR(500) NULL,
            notes VARCHAR(1000) NULL,
            client_id BIGINT NULL REFERENCES clients(id),
            pet_id BIGINT NULL REFERENCES pets(id),
            employee_id BIGINT NULL REFERENCES employees(id),
            guest_name VARCHAR(100) NULL,
            guest_phone VARCHAR(15) NULL,
            guest_pet_type VARCHAR(20) NULL,
            guest_breed VARCHAR(100) NULL,
            guest_email VARCHAR(100) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT valid_appointment_window CHECK (end_at >= start_at)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create waiting_room table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS waiting_room (
            id BIGSERIAL PRIMARY KEY,
            client_id BIGINT NOT NULL REFERENCES clients(id),
            pet_id BIGINT NOT NULL REFERENCES pets(id),
            arrival_time TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            status VARCHAR(20) NOT NULL DEFAULT 'WAITING',
            priority VARCHAR(20) NOT NULL DEFAULT 'NORMAL',
            reason_for_visit VARCHAR(500) NULL,
            notes VARCHAR(1000) NULL,
            consultation_started_at TIMESTAMP WITH TIME ZONE NULL,
            completed_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_appointments_start_at ON appointments(start_at)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_client_id ON appointments(client_id)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_pet_id ON appointments(pet_id)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_employee_id ON appointments(employee_id)",
        "CREATE INDEX IF NOT EXISTS idx_pet_owners_client_id ON pet_owners(client_id)",
        "CREATE INDEX IF NOT EXISTS idx_pets_name ON pets(LOWER(name))",
        "CREATE INDEX IF NOT EXISTS idx_waiting_room_status ON waiting_room(status)",
        "CREATE INDEX IF NOT EXISTS idx_waiting_room_arrival_time ON waiting_room(arrival_time)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
