mod memory;
mod postgres;

pub use memory::MemoryPersonStore;
pub use postgres::PgPersonStore;

use crate::database::{DbError, Person, PersonDetails};
use async_trait::async_trait;

/// The key-value record store holding one `Person` per `person_id`.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Create tables/indexes if they don't exist yet.
    async fn ensure_schema(&self) -> Result<(), DbError>;

    async fn ping(&self) -> Result<(), DbError>;

    async fn get(&self, person_id: &str) -> Result<Option<Person>, DbError>;

    /// Fails with `DbError::Conflict` when the id is taken.
    async fn insert(&self, person: &Person) -> Result<(), DbError>;

    /// Returns the updated record, or `None` when it doesn't exist.
    async fn update_details(
        &self,
        person_id: &str,
        details: &PersonDetails,
    ) -> Result<Option<Person>, DbError>;

    async fn set_primary_photo(&self, person_id: &str, key: Option<&str>) -> Result<(), DbError>;

    async fn add_photo_hash(&self, person_id: &str, hash: &str) -> Result<(), DbError>;

    async fn remove_photo_hash(&self, person_id: &str, hash: &str) -> Result<(), DbError>;

    async fn find_by_photo_hash(&self, hash: &str) -> Result<Option<String>, DbError>;

    /// Returns whether a record was removed.
    async fn delete(&self, person_id: &str) -> Result<bool, DbError>;

    /// Every person, oldest first.
    async fn list(&self) -> Result<Vec<Person>, DbError>;
}

/// Behaviour every store must share, run against each implementation.
#[cfg(test)]
pub(crate) async fn check_store_behaviour(store: &dyn PersonStore) -> Result<(), DbError> {
    let person_id = crate::utils::new_id();
    let hash = format!("hash-{person_id}");
    store
        .insert(&Person::new(
            &person_id,
            PersonDetails {
                name: Some("Ann".to_string()),
                relationship: Some("daughter".to_string()),
                age: Some(43),
                notes: Some("Visits on Sundays".to_string()),
            },
        ))
        .await?;

    // Omitted fields keep their stored value.
    let updated = store
        .update_details(
            &person_id,
            &PersonDetails {
                age: Some(44),
                ..PersonDetails::default()
            },
        )
        .await?
        .expect("person exists");
    assert_eq!(updated.name.as_deref(), Some("Ann"));
    assert_eq!(updated.relationship.as_deref(), Some("daughter"));
    assert_eq!(updated.age, Some(44));
    assert_eq!(updated.notes, "Visits on Sundays");
    assert!(updated.updated_at.is_some());

    let cleared = store
        .update_details(
            &person_id,
            &PersonDetails {
                notes: Some(String::new()),
                ..PersonDetails::default()
            },
        )
        .await?
        .expect("person exists");
    assert_eq!(cleared.notes, "");
    assert_eq!(cleared.age, Some(44));

    store.add_photo_hash(&person_id, &hash).await?;
    store.add_photo_hash(&person_id, &hash).await?;
    let stored = store.get(&person_id).await?.expect("person exists");
    assert_eq!(stored.photo_hashes, vec![hash.clone()]);
    assert_eq!(
        store.find_by_photo_hash(&hash).await?.as_deref(),
        Some(person_id.as_str())
    );

    store.remove_photo_hash(&person_id, &hash).await?;
    assert_eq!(store.find_by_photo_hash(&hash).await?, None);

    assert!(store.delete(&person_id).await?);
    assert_eq!(store.get(&person_id).await?, None);
    assert!(
        store
            .update_details(&person_id, &PersonDetails::default())
            .await?
            .is_none()
    );
    Ok(())
}
