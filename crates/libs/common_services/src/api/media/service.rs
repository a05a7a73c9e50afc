use super::error::MediaError;
use super::interfaces::{AddMediaResponse, DeleteMediaResponse, MediaItem, MediaListResponse};
use crate::api::presigned_url;
use crate::collaborators::{Collaborators, ObjectInfo};
use crate::database::{Person, media_id_from_key, person_prefix, photo_key};
use crate::imaging::{ImageError, NormalizeOptions, NormalizedImage, normalize_base64_image};
use crate::utils::{content_hash, new_id};
use app_state::AppSettings;
use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, instrument};

/// Normalize every upload, failing on the first one that isn't a usable image.
pub async fn normalize_all(
    images: &[String],
    options: NormalizeOptions,
) -> Result<Vec<NormalizedImage>, ImageError> {
    let mut normalized = Vec::with_capacity(images.len());
    for image in images {
        normalized.push(normalize_base64_image(image, options).await?);
    }
    Ok(normalized)
}

/// Store photos in the person's gallery and remember their hashes.
///
/// Photos the person already has are skipped and counted. When the person has
/// no primary photo yet, the first stored one becomes primary.
pub async fn store_photos(
    collaborators: &Collaborators,
    person: &Person,
    photos: Vec<NormalizedImage>,
) -> Result<(Vec<MediaItem>, usize), MediaError> {
    let mut seen: HashSet<String> = person.photo_hashes.iter().cloned().collect();
    let mut primary = person.s3_key.clone();
    let mut added = Vec::new();
    let mut duplicates = 0;

    for photo in photos {
        if !seen.insert(photo.content_hash.clone()) {
            duplicates += 1;
            continue;
        }
        let media_id = new_id();
        let key = photo_key(&person.person_id, &media_id);
        collaborators.objects.put(&key, &photo.jpeg).await?;
        collaborators
            .people
            .add_photo_hash(&person.person_id, &photo.content_hash)
            .await?;

        if primary.is_none() {
            collaborators
                .people
                .set_primary_photo(&person.person_id, Some(&key))
                .await?;
            primary = Some(key.clone());
        }

        added.push(MediaItem {
            url: presigned_url(&collaborators.signer, Some(&key)),
            is_primary: primary.as_deref() == Some(key.as_str()),
            media_id,
            key,
            size: photo.jpeg.len() as u64,
            uploaded_at: Utc::now(),
        });
    }

    Ok((added, duplicates))
}

fn to_media_item(
    collaborators: &Collaborators,
    person: &Person,
    object: ObjectInfo,
) -> Option<MediaItem> {
    let media_id = media_id_from_key(&person.person_id, &object.key)?.to_string();
    Some(MediaItem {
        url: presigned_url(&collaborators.signer, Some(&object.key)),
        is_primary: person.s3_key.as_deref() == Some(object.key.as_str()),
        media_id,
        key: object.key,
        size: object.size,
        uploaded_at: object.last_modified,
    })
}

async fn require_person(
    collaborators: &Collaborators,
    person_id: &str,
) -> Result<Person, MediaError> {
    collaborators
        .people
        .get(person_id)
        .await?
        .ok_or_else(|| MediaError::PersonNotFound(person_id.to_string()))
}

/// Every photo of a person, oldest first.
#[instrument(skip(collaborators))]
pub async fn list_media(
    collaborators: &Collaborators,
    person_id: &str,
) -> Result<MediaListResponse, MediaError> {
    let person = require_person(collaborators, person_id).await?;
    let objects = collaborators
        .objects
        .list(&person_prefix(person_id))
        .await?;

    let mut media: Vec<MediaItem> = objects
        .into_iter()
        .filter_map(|object| to_media_item(collaborators, &person, object))
        .collect();
    media.sort_by(|a, b| {
        a.uploaded_at
            .cmp(&b.uploaded_at)
            .then_with(|| a.key.cmp(&b.key))
    });

    Ok(MediaListResponse {
        person_id: person_id.to_string(),
        media,
    })
}

#[instrument(skip(collaborators, settings, images), fields(count = images.len()))]
pub async fn add_media(
    collaborators: &Collaborators,
    settings: &AppSettings,
    person_id: &str,
    images: Vec<String>,
) -> Result<AddMediaResponse, MediaError> {
    if images.is_empty() {
        return Err(MediaError::BadRequest("No images provided".to_string()));
    }
    let person = require_person(collaborators, person_id).await?;
    let photos = normalize_all(&images, NormalizeOptions::from(&settings.image)).await?;
    let (added, duplicates) = store_photos(collaborators, &person, photos).await?;
    info!(
        "Added {} photos to person {person_id} ({duplicates} duplicates skipped)",
        added.len()
    );

    Ok(AddMediaResponse {
        success: true,
        person_id: person_id.to_string(),
        added,
        duplicates,
    })
}

/// Remove one photo. Removing the primary photo promotes the newest remaining one.
#[instrument(skip(collaborators))]
pub async fn delete_media(
    collaborators: &Collaborators,
    person_id: &str,
    media_id: &str,
) -> Result<DeleteMediaResponse, MediaError> {
    let person = require_person(collaborators, person_id).await?;
    if media_id.is_empty() || media_id.contains('/') {
        return Err(MediaError::MediaNotFound(media_id.to_string()));
    }
    let key = photo_key(person_id, media_id);

    let Some(bytes) = collaborators.objects.get(&key).await? else {
        return Err(MediaError::MediaNotFound(media_id.to_string()));
    };
    collaborators.objects.delete(&key).await?;
    collaborators
        .people
        .remove_photo_hash(person_id, &content_hash(&bytes))
        .await?;

    let mut primary = person.s3_key.clone();
    if primary.as_deref() == Some(key.as_str()) {
        let remaining = collaborators
            .objects
            .list(&person_prefix(person_id))
            .await?;
        primary = remaining
            .into_iter()
            .max_by(|a, b| {
                a.last_modified
                    .cmp(&b.last_modified)
                    .then_with(|| a.key.cmp(&b.key))
            })
            .map(|object| object.key);
        collaborators
            .people
            .set_primary_photo(person_id, primary.as_deref())
            .await?;
        info!("Primary photo of {person_id} is now {primary:?}");
    }

    Ok(DeleteMediaResponse {
        success: true,
        person_id: person_id.to_string(),
        media_id: media_id.to_string(),
        primary_photo_url: presigned_url(&collaborators.signer, primary.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::PersonDetails;
    use crate::test_support::{face_image, memory_collaborators, settings};

    async fn insert_person(collaborators: &Collaborators) -> Person {
        let person = Person::new("p1", PersonDetails::default());
        collaborators
            .people
            .insert(&person)
            .await
            .expect("insert person");
        person
    }

    #[tokio::test]
    async fn test_add_list_and_delete_media() -> Result<(), MediaError> {
        let collaborators = memory_collaborators();
        let settings = settings();
        insert_person(&collaborators).await;

        let added = add_media(
            &collaborators,
            &settings,
            "p1",
            vec![face_image(10), face_image(90)],
        )
        .await?;
        assert_eq!(added.added.len(), 2);
        assert_eq!(added.duplicates, 0);
        assert!(added.added[0].is_primary);
        assert!(!added.added[1].is_primary);

        let listed = list_media(&collaborators, "p1").await?;
        assert_eq!(listed.media.len(), 2);
        assert!(listed.media.iter().all(|m| m.url.is_some()));

        let primary = added.added[0].media_id.clone();
        let deleted = delete_media(&collaborators, "p1", &primary).await?;
        let promoted = deleted.primary_photo_url.expect("another photo was promoted");
        assert!(promoted.contains(&added.added[1].key));

        let person = collaborators.people.get("p1").await?.expect("person");
        assert_eq!(person.s3_key.as_deref(), Some(added.added[1].key.as_str()));
        assert_eq!(person.photo_hashes.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_photo_is_not_stored_twice() -> Result<(), MediaError> {
        let collaborators = memory_collaborators();
        let settings = settings();
        insert_person(&collaborators).await;

        let first = add_media(&collaborators, &settings, "p1", vec![face_image(50)]).await?;
        assert_eq!(first.added.len(), 1);

        let again = add_media(
            &collaborators,
            &settings,
            "p1",
            vec![face_image(50), face_image(50)],
        )
        .await?;
        assert!(again.added.is_empty());
        assert_eq!(again.duplicates, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_photo_can_be_uploaded_again() -> Result<(), MediaError> {
        let collaborators = memory_collaborators();
        let settings = settings();
        insert_person(&collaborators).await;

        let first = add_media(&collaborators, &settings, "p1", vec![face_image(70)]).await?;
        delete_media(&collaborators, "p1", &first.added[0].media_id).await?;

        let person = collaborators.people.get("p1").await?.expect("person");
        assert_eq!(person.s3_key, None);

        let again = add_media(&collaborators, &settings, "p1", vec![face_image(70)]).await?;
        assert_eq!(again.added.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_person_and_media() -> Result<(), MediaError> {
        let collaborators = memory_collaborators();
        assert!(matches!(
            list_media(&collaborators, "nobody").await,
            Err(MediaError::PersonNotFound(_))
        ));

        insert_person(&collaborators).await;
        assert!(matches!(
            delete_media(&collaborators, "p1", "missing").await,
            Err(MediaError::MediaNotFound(_))
        ));
        assert!(matches!(
            add_media(&collaborators, &settings(), "p1", Vec::new()).await,
            Err(MediaError::BadRequest(_))
        ));
        Ok(())
    }
}
