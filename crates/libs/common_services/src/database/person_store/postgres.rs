use super::PersonStore;
use crate::database::{DbError, Person, PersonDetails};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

#[derive(Clone)]
pub struct PgPersonStore {
    pool: PgPool,
}

impl PgPersonStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for PgPersonStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        info!("Running database migrations.");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, person_id: &str) -> Result<Option<Person>, DbError> {
        Ok(
            sqlx::query_as::<_, Person>("SELECT * FROM person WHERE person_id = $1")
                .bind(person_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, person: &Person) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO person (person_id, name, relationship, age, notes, face_id, s3_key,
                                photo_hashes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(&person.person_id)
        .bind(&person.name)
        .bind(&person.relationship)
        .bind(person.age)
        .bind(&person.notes)
        .bind(&person.face_id)
        .bind(&person.s3_key)
        .bind(&person.photo_hashes)
        .bind(person.created_at)
        .bind(person.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_details(
        &self,
        person_id: &str,
        details: &PersonDetails,
    ) -> Result<Option<Person>, DbError> {
        Ok(sqlx::query_as::<_, Person>(
            r"
            UPDATE person
            SET
                name = COALESCE($2, name),
                relationship = COALESCE($3, relationship),
                age = COALESCE($4, age),
                notes = COALESCE($5, notes),
                updated_at = now()
            WHERE person_id = $1
            RETURNING *
            ",
        )
        .bind(person_id)
        .bind(&details.name)
        .bind(&details.relationship)
        .bind(details.age)
        .bind(&details.notes)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_primary_photo(&self, person_id: &str, key: Option<&str>) -> Result<(), DbError> {
        sqlx::query("UPDATE person SET s3_key = $2, updated_at = now() WHERE person_id = $1")
            .bind(person_id)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_photo_hash(&self, person_id: &str, hash: &str) -> Result<(), DbError> {
        sqlx::query(
            r"
            UPDATE person
            SET photo_hashes = array_append(photo_hashes, $2)
            WHERE person_id = $1 AND NOT ($2 = ANY (photo_hashes))
            ",
        )
        .bind(person_id)
        .bind(hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_photo_hash(&self, person_id: &str, hash: &str) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE person SET photo_hashes = array_remove(photo_hashes, $2) WHERE person_id = $1",
        )
        .bind(person_id)
        .bind(hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_photo_hash(&self, hash: &str) -> Result<Option<String>, DbError> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT person_id FROM person WHERE $1 = ANY (photo_hashes) ORDER BY created_at LIMIT 1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, person_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM person WHERE person_id = $1")
            .bind(person_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Person>, DbError> {
        Ok(
            sqlx::query_as::<_, Person>("SELECT * FROM person ORDER BY created_at, person_id")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::get_db_pool;
    use super::super::check_store_behaviour;
    use crate::test_support::settings;

    /// Runs only when `TEST_DATABASE_URL` points at a disposable Postgres.
    #[tokio::test]
    async fn test_shared_store_behaviour() -> color_eyre::Result<()> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            info!("TEST_DATABASE_URL not set, skipping Postgres store test.");
            return Ok(());
        };
        let store = PgPersonStore::new(get_db_pool(&database_url, &settings().database)?);
        store.ensure_schema().await?;

        check_store_behaviour(&store).await?;
        Ok(())
    }
}
