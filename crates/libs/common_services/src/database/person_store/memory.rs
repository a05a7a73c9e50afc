use super::PersonStore;
use crate::database::{DbError, Person, PersonDetails};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local record store for development and tests.
#[derive(Default)]
pub struct MemoryPersonStore {
    people: RwLock<HashMap<String, Person>>,
}

impl MemoryPersonStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonStore for MemoryPersonStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn get(&self, person_id: &str) -> Result<Option<Person>, DbError> {
        Ok(self.people.read().await.get(person_id).cloned())
    }

    async fn insert(&self, person: &Person) -> Result<(), DbError> {
        let mut people = self.people.write().await;
        if people.contains_key(&person.person_id) {
            return Err(DbError::Conflict(person.person_id.clone()));
        }
        people.insert(person.person_id.clone(), person.clone());
        Ok(())
    }

    async fn update_details(
        &self,
        person_id: &str,
        details: &PersonDetails,
    ) -> Result<Option<Person>, DbError> {
        let mut people = self.people.write().await;
        Ok(people.get_mut(person_id).map(|person| {
            person.apply(details);
            person.clone()
        }))
    }

    async fn set_primary_photo(&self, person_id: &str, key: Option<&str>) -> Result<(), DbError> {
        if let Some(person) = self.people.write().await.get_mut(person_id) {
            person.s3_key = key.map(ToString::to_string);
            person.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn add_photo_hash(&self, person_id: &str, hash: &str) -> Result<(), DbError> {
        if let Some(person) = self.people.write().await.get_mut(person_id) {
            if !person.photo_hashes.iter().any(|h| h == hash) {
                person.photo_hashes.push(hash.to_string());
            }
        }
        Ok(())
    }

    async fn remove_photo_hash(&self, person_id: &str, hash: &str) -> Result<(), DbError> {
        if let Some(person) = self.people.write().await.get_mut(person_id) {
            person.photo_hashes.retain(|h| h != hash);
        }
        Ok(())
    }

    async fn find_by_photo_hash(&self, hash: &str) -> Result<Option<String>, DbError> {
        let people = self.people.read().await;
        Ok(people
            .values()
            .filter(|p| p.photo_hashes.iter().any(|h| h == hash))
            .min_by_key(|p| p.created_at)
            .map(|p| p.person_id.clone()))
    }

    async fn delete(&self, person_id: &str) -> Result<bool, DbError> {
        Ok(self.people.write().await.remove(person_id).is_some())
    }

    async fn list(&self) -> Result<Vec<Person>, DbError> {
        let mut people: Vec<Person> = self.people.read().await.values().cloned().collect();
        people.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.person_id.cmp(&b.person_id))
        });
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_rejects_duplicate_ids() -> Result<(), DbError> {
        let store = MemoryPersonStore::new();
        let person = Person::new("p1", PersonDetails::default());
        store.insert(&person).await?;

        let second = store.insert(&person).await;
        assert!(matches!(second, Err(DbError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_photo_hash_lookup() -> Result<(), DbError> {
        let store = MemoryPersonStore::new();
        store.insert(&Person::new("p1", PersonDetails::default())).await?;
        store.add_photo_hash("p1", "abc").await?;
        store.add_photo_hash("p1", "abc").await?;

        assert_eq!(store.find_by_photo_hash("abc").await?.as_deref(), Some("p1"));
        assert_eq!(store.find_by_photo_hash("zzz").await?, None);
        let person = store.get("p1").await?.expect("person exists");
        assert_eq!(person.photo_hashes, vec!["abc".to_string()]);

        store.remove_photo_hash("p1", "abc").await?;
        assert_eq!(store.find_by_photo_hash("abc").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_shared_store_behaviour() -> Result<(), DbError> {
        super::super::check_store_behaviour(&MemoryPersonStore::new()).await
    }

    #[tokio::test]
    async fn test_update_missing_person_returns_none() -> Result<(), DbError> {
        let store = MemoryPersonStore::new();
        let updated = store
            .update_details("nobody", &PersonDetails::default())
            .await?;
        assert!(updated.is_none());
        assert!(!store.delete("nobody").await?);
        Ok(())
    }
}
