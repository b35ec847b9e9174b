use crate::{models::DbPet, repositories::contains_pattern};
use eyre::Result;
use sqlx::{Pool, Postgres};
use vetclinic_core::models::pet::Pet;

const PET_SELECT: &str = r#"
    SELECT p.id, p.name, p.pet_type, p.breed, p.active,
           COALESCE(array_agg(po.client_id) FILTER (WHERE po.client_id IS NOT NULL), '{}') AS owner_ids
    FROM pets p
    LEFT JOIN pet_owners po ON po.pet_id = p.id
"#;

/// Result of folding one pet record into another.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged(Pet),
    /// One of the two ids does not name a pet.
    Missing(i64),
    /// The two pets are not recognisably the same animal.
    Mismatch,
}

pub async fn get_pet_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<Pet>> {
    let row = sqlx::query_as::<_, DbPet>(&format!(
        "{PET_SELECT} WHERE p.id = $1 GROUP BY p.id"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(DbPet::into_domain).transpose()
}

pub async fn list_pets_by_owner(pool: &Pool<Postgres>, client_id: i64) -> Result<Vec<Pet>> {
    tracing::debug!("Listing pets owned by client {}", client_id);

    let rows = sqlx::query_as::<_, DbPet>(&format!(
        "{PET_SELECT}
         WHERE p.active = TRUE
           AND p.id IN (SELECT pet_id FROM pet_owners WHERE client_id = $1)
         GROUP BY p.id
         ORDER BY p.name ASC"
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DbPet::into_domain).collect()
}

/// Active pets whose name contains `name`, ignoring case.
pub async fn find_similar_pets_by_name(pool: &Pool<Postgres>, name: &str) -> Result<Vec<Pet>> {
    tracing::debug!("Looking for pets similar to {:?}", name);

    let rows = sqlx::query_as::<_, DbPet>(&format!(
        "{PET_SELECT}
         WHERE p.active = TRUE AND p.name ILIKE $1 ESCAPE '\\'
         GROUP BY p.id
         ORDER BY p.name ASC"
    ))
    .bind(contains_pattern(name.trim()))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DbPet::into_domain).collect()
}

pub async fn is_pet_owned_by(pool: &Pool<Postgres>, pet_id: i64, client_id: i64) -> Result<bool> {
    let owned = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM pet_owners WHERE pet_id = $1 AND client_id = $2
        )
        "#,
    )
    .bind(pet_id)
    .bind(client_id)
    .fetch_one(pool)
    .await?;

    Ok(owned)
}

/// Moves every owner of `remove_pet_id` onto `keep_pet_id`, repoints its
/// appointments and deactivates it. Runs in a single transaction.
pub async fn merge_pets(
    pool: &Pool<Postgres>,
    keep_pet_id: i64,
    remove_pet_id: i64,
) -> Result<MergeOutcome> {
    tracing::debug!("Merging pet {} into pet {}", remove_pet_id, keep_pet_id);

    let mut tx = pool.begin().await?;

    let rows: Vec<(i64, String, String)> = sqlx::query_as(
        r#"
        SELECT id, name, pet_type FROM pets
        WHERE id = ANY($1)
        FOR UPDATE
        "#,
    )
    .bind(vec![keep_pet_id, remove_pet_id])
    .fetch_all(&mut *tx)
    .await?;

    let find = |id: i64| rows.iter().find(|(pet, _, _)| *pet == id);
    let (keep, remove) = match (find(keep_pet_id), find(remove_pet_id)) {
        (Some(keep), Some(remove)) => (keep, remove),
        (None, _) => return Ok(MergeOutcome::Missing(keep_pet_id)),
        (_, None) => return Ok(MergeOutcome::Missing(remove_pet_id)),
    };
    if keep.1.to_lowercase() != remove.1.to_lowercase() || keep.2 != remove.2 {
        tracing::warn!(
            "Refusing to merge pet {} into pet {}: name or type differ",
            remove_pet_id, keep_pet_id
        );
        return Ok(MergeOutcome::Mismatch);
    }

    sqlx::query(
        r#"
        INSERT INTO pet_owners (pet_id, client_id)
        SELECT $1, client_id FROM pet_owners WHERE pet_id = $2
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(keep_pet_id)
    .bind(remove_pet_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE appointments SET pet_id = $1 WHERE pet_id = $2")
        .bind(keep_pet_id)
        .bind(remove_pet_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE pets SET active = FALSE WHERE id = $1")
        .bind(remove_pet_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Merged pet {} into pet {}", remove_pet_id, keep_pet_id);

    match get_pet_by_id(pool, keep_pet_id).await? {
        Some(pet) => Ok(MergeOutcome::Merged(pet)),
        None => Ok(MergeOutcome::Missing(keep_pet_id)),
    }
}
