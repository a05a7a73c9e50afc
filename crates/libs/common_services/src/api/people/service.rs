use super::error::PeopleError;
use super::interfaces::{
    AddPersonRequest, AddPersonResponse, DeletePersonResponse, DeletionStep, PersonResponse,
    ReminderItem, RemindersResponse, UpdatePersonRequest, UpdatePersonResponse,
};
use crate::api::media::service::{normalize_all, store_photos};
use crate::api::{non_blank, presigned_url};
use crate::collaborators::{
    Collaborators, FaceCollectionError, FaceMatch, IndexedFace, validate_prefix,
};
use crate::database::{Person, PersonDetails, person_prefix, photo_key};
use crate::imaging::{NormalizeOptions, NormalizedImage, normalize_base64_image};
use crate::utils::new_id;
use app_state::AppSettings;
use std::fmt::Display;
use tracing::{error, info, instrument, warn};

fn validate_age(age: Option<i32>) -> Result<(), PeopleError> {
    match age {
        Some(age) if age < 0 => Err(PeopleError::BadRequest(format!(
            "Age can't be negative, got {age}"
        ))),
        _ => Ok(()),
    }
}

/// Enroll a person from a photo, or update them when their face is already known.
///
/// Enrollment is serialized by the collaborators' enrollment lock, so two uploads
/// of the same face can't both miss the search and create two people.
#[instrument(skip(collaborators, settings, request), fields(name = ?request.name))]
pub async fn add_person(
    collaborators: &Collaborators,
    settings: &AppSettings,
    request: AddPersonRequest,
) -> Result<AddPersonResponse, PeopleError> {
    let (Some(image), Some(name), Some(relationship)) = (
        non_blank(request.image),
        non_blank(request.name),
        non_blank(request.relationship),
    ) else {
        return Err(PeopleError::BadRequest(
            "Image, name, and relationship required".to_string(),
        ));
    };
    validate_age(request.age)?;
    let details = PersonDetails {
        name: Some(name),
        relationship: Some(relationship),
        age: request.age,
        notes: request.notes,
    };

    let photo = normalize_base64_image(&image, NormalizeOptions::from(&settings.image)).await?;

    let _guard = collaborators.enrollment_lock.lock().await;

    if let Some(person_id) = collaborators
        .people
        .find_by_photo_hash(&photo.content_hash)
        .await?
    {
        collaborators
            .people
            .update_details(&person_id, &details)
            .await?;
        info!("Photo was uploaded before, updated person {person_id} without storing it again.");
        let mut response =
            AddPersonResponse::updated(person_id, "Person info updated, photo already stored");
        response.duplicate_photo = Some(true);
        return Ok(response);
    }

    let search = collaborators
        .faces
        .search(&photo.jpeg, settings.recognition.similarity_threshold)
        .await;
    match search {
        Ok(Some(found)) => update_matched(collaborators, found, details, &photo).await,
        Ok(None) | Err(FaceCollectionError::NoFaceDetected) => {
            enroll_new(collaborators, details, &photo).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn update_matched(
    collaborators: &Collaborators,
    found: FaceMatch,
    details: PersonDetails,
    photo: &NormalizedImage,
) -> Result<AddPersonResponse, PeopleError> {
    let person_id = found.external_id;
    let key = photo_key(&person_id, &new_id());

    match collaborators
        .people
        .update_details(&person_id, &details)
        .await?
    {
        Some(existing) => {
            collaborators.objects.put(&key, &photo.jpeg).await?;
            collaborators
                .people
                .add_photo_hash(&person_id, &photo.content_hash)
                .await?;
            if existing.s3_key.is_none() {
                collaborators
                    .people
                    .set_primary_photo(&person_id, Some(&key))
                    .await?;
            }
            info!(
                "Face matched person {person_id} ({:.1}), stored new photo {key}",
                found.similarity
            );
        }
        None => {
            // Face left behind by an interrupted delete; give it a record again.
            warn!(
                "Face {} matched person {person_id} without a record, recreating it.",
                found.face_id
            );
            let mut person = Person::new(&person_id, details);
            person.face_id = Some(found.face_id);
            person.s3_key = Some(key.clone());
            person.photo_hashes = vec![photo.content_hash.clone()];
            collaborators.objects.put(&key, &photo.jpeg).await?;
            collaborators.people.insert(&person).await?;
        }
    }

    Ok(AddPersonResponse::updated(
        person_id,
        "Person info updated with new photo",
    ))
}

async fn enroll_new(
    collaborators: &Collaborators,
    details: PersonDetails,
    photo: &NormalizedImage,
) -> Result<AddPersonResponse, PeopleError> {
    let person_id = new_id();
    let Some(face) = collaborators.faces.index(&photo.jpeg, &person_id).await? else {
        return Err(PeopleError::NoFaceDetected);
    };

    let key = photo_key(&person_id, &face.face_id);
    let mut person = Person::new(&person_id, details);
    person.face_id = Some(face.face_id.clone());
    person.s3_key = Some(key.clone());
    person.photo_hashes = vec![photo.content_hash.clone()];

    let stored = async {
        collaborators.objects.put(&key, &photo.jpeg).await?;
        collaborators.people.insert(&person).await?;
        Ok::<(), PeopleError>(())
    }
    .await;
    if let Err(e) = stored {
        undo_enrollment(collaborators, &face, &key).await;
        return Err(e);
    }

    info!("Enrolled new person {person_id} with face {}", face.face_id);
    Ok(AddPersonResponse::created(person_id, face.face_id))
}

/// Best effort removal of what a failed enrollment left behind.
async fn undo_enrollment(collaborators: &Collaborators, face: &IndexedFace, key: &str) {
    if let Err(e) = collaborators
        .faces
        .delete_faces(std::slice::from_ref(&face.face_id))
        .await
    {
        error!("Could not remove face {} after failed enrollment: {e}", face.face_id);
    }
    if let Err(e) = collaborators.objects.delete(key).await {
        error!("Could not remove photo {key} after failed enrollment: {e}");
    }
}

async fn person_response(
    collaborators: &Collaborators,
    person: Person,
) -> Result<PersonResponse, PeopleError> {
    let media_count = collaborators
        .objects
        .list(&person.storage_prefix())
        .await?
        .len();
    Ok(PersonResponse {
        photo_url: presigned_url(&collaborators.signer, person.s3_key.as_deref()),
        media_count,
        person,
    })
}

#[instrument(skip(collaborators))]
pub async fn get_person(
    collaborators: &Collaborators,
    person_id: &str,
) -> Result<PersonResponse, PeopleError> {
    let person = collaborators
        .people
        .get(person_id)
        .await?
        .ok_or_else(|| PeopleError::NotFound(person_id.to_string()))?;
    person_response(collaborators, person).await
}

/// Update the provided fields and append any provided images to the gallery.
#[instrument(skip(collaborators, settings, request))]
pub async fn update_person(
    collaborators: &Collaborators,
    settings: &AppSettings,
    person_id: &str,
    request: UpdatePersonRequest,
) -> Result<UpdatePersonResponse, PeopleError> {
    validate_age(request.age)?;
    let details = PersonDetails {
        name: non_blank(request.name),
        relationship: non_blank(request.relationship),
        age: request.age,
        notes: request.notes,
    };
    let images: Vec<String> = request
        .images
        .into_iter()
        .filter(|image| !image.trim().is_empty())
        .collect();
    // Reject bad images before anything is written.
    let photos = normalize_all(&images, NormalizeOptions::from(&settings.image)).await?;

    let person = collaborators
        .people
        .update_details(person_id, &details)
        .await?
        .ok_or_else(|| PeopleError::NotFound(person_id.to_string()))?;

    let (added_media, duplicates) = store_photos(collaborators, &person, photos).await?;
    info!(
        "Updated person {person_id}, added {} photos ({duplicates} duplicates)",
        added_media.len()
    );

    let person = collaborators
        .people
        .get(person_id)
        .await?
        .unwrap_or(person);
    Ok(UpdatePersonResponse {
        success: true,
        person: person_response(collaborators, person).await?,
        added_media,
    })
}

fn incomplete(
    person_id: &str,
    completed_steps: &[DeletionStep],
    failed_step: DeletionStep,
    reason: impl Display,
) -> PeopleError {
    PeopleError::DeletionIncomplete {
        person_id: person_id.to_string(),
        completed_steps: completed_steps.to_vec(),
        failed_step,
        reason: reason.to_string(),
    }
}

async fn remove_face_entries(
    collaborators: &Collaborators,
    person_id: &str,
    known_face: Option<&str>,
) -> Result<usize, FaceCollectionError> {
    let mut face_ids: Vec<String> = collaborators
        .faces
        .list_faces(Some(person_id))
        .await?
        .into_iter()
        .map(|face| face.face_id)
        .collect();
    if let Some(known_face) = known_face {
        if !face_ids.iter().any(|id| id == known_face) {
            face_ids.push(known_face.to_string());
        }
    }
    collaborators.faces.delete_faces(&face_ids).await
}

/// Delete a person's face entries, then their photos, then their record.
///
/// Faces go first so the person stops being recognized, the record goes last so
/// a failed run can be repeated: every step is idempotent.
#[instrument(skip(collaborators))]
pub async fn delete_person(
    collaborators: &Collaborators,
    person_id: &str,
) -> Result<DeletePersonResponse, PeopleError> {
    let prefix = person_prefix(person_id);
    if validate_prefix(&prefix).is_err() {
        return Err(PeopleError::NotFound(person_id.to_string()));
    }

    let _guard = collaborators.enrollment_lock.lock().await;
    let record = collaborators.people.get(person_id).await?;
    let known_face = record.as_ref().and_then(|p| p.face_id.as_deref());
    let mut completed = Vec::with_capacity(3);

    let faces_removed = remove_face_entries(collaborators, person_id, known_face)
        .await
        .map_err(|e| incomplete(person_id, &completed, DeletionStep::FaceEntries, e))?;
    completed.push(DeletionStep::FaceEntries);

    let objects_removed = collaborators
        .objects
        .delete_prefix(&prefix)
        .await
        .map_err(|e| incomplete(person_id, &completed, DeletionStep::StoredObjects, e))?;
    completed.push(DeletionStep::StoredObjects);

    if record.is_none() && faces_removed == 0 && objects_removed == 0 {
        return Err(PeopleError::NotFound(person_id.to_string()));
    }

    let record_removed = collaborators
        .people
        .delete(person_id)
        .await
        .map_err(|e| incomplete(person_id, &completed, DeletionStep::Record, e))?;

    info!(
        "Deleted person {person_id}: {faces_removed} faces, {objects_removed} objects, record {}",
        if record_removed { "removed" } else { "already gone" }
    );
    Ok(DeletePersonResponse {
        success: true,
        person_id: person_id.to_string(),
        faces_removed,
        objects_removed,
        record_removed,
    })
}

/// Everyone the patient should be reminded of, oldest first.
#[instrument(skip(collaborators))]
pub async fn list_reminders(
    collaborators: &Collaborators,
) -> Result<RemindersResponse, PeopleError> {
    let reminders = collaborators
        .people
        .list()
        .await?
        .into_iter()
        .map(|person| ReminderItem {
            photo_url: presigned_url(&collaborators.signer, person.s3_key.as_deref()),
            person_id: person.person_id,
            name: person.name,
            relationship: person.relationship,
            age: person.age,
            notes: person.notes,
            added_date: person.created_at,
        })
        .collect();
    Ok(RemindersResponse { reminders })
}
