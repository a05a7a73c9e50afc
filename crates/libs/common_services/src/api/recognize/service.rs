use super::announcement::{AnnouncementSubject, compose};
use super::error::RecognizeError;
use super::interfaces::{RecognizeResponse, RecognizedPerson};
use crate::api::presigned_url;
use crate::collaborators::{Collaborators, FaceCollectionError, SpeechSynthesizer};
use crate::imaging::{ImageError, NormalizeOptions, normalize_base64_image};
use app_state::AppSettings;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, instrument, warn};

pub const NO_FACE_NOTE: &str = "No face detected";
pub const NOT_RECOGNIZED_NOTE: &str = "Person not recognized";

/// Match a camera frame against known people and announce who it is.
///
/// An image without a face or without a good enough match is not an error,
/// it yields an unmatched response.
#[instrument(skip(collaborators, settings, image))]
pub async fn recognize_face(
    collaborators: &Collaborators,
    settings: &AppSettings,
    image: Option<&str>,
) -> Result<RecognizeResponse, RecognizeError> {
    let image = image
        .filter(|i| !i.trim().is_empty())
        .ok_or(ImageError::Missing)?;
    let normalized = normalize_base64_image(image, NormalizeOptions::from(&settings.image)).await?;

    let search = collaborators
        .faces
        .search(&normalized.jpeg, settings.recognition.similarity_threshold)
        .await;
    let found = match search {
        Ok(Some(found)) => found,
        Ok(None) => {
            info!("Face did not match anyone.");
            return Ok(RecognizeResponse::unmatched(NOT_RECOGNIZED_NOTE));
        }
        Err(FaceCollectionError::NoFaceDetected) => {
            info!("No face in the submitted frame.");
            return Ok(RecognizeResponse::unmatched(NO_FACE_NOTE));
        }
        Err(e) => return Err(e.into()),
    };

    let person = collaborators.people.get(&found.external_id).await?;
    if person.is_none() {
        warn!(
            "Face {} matched person {} but there is no record for them.",
            found.face_id, found.external_id
        );
    }
    let subject = AnnouncementSubject::from_person(person.as_ref());
    let note = compose(
        &subject,
        collaborators.rephraser.as_deref(),
        &settings.announcement,
    )
    .await;
    info!(
        "Recognized person {} with similarity {:.1}",
        found.external_id, found.similarity
    );

    let (audio, audio_format) = match collaborators.speech.as_deref() {
        Some(speech) => speak(speech, &note).await,
        None => (None, None),
    };

    let photo_url = presigned_url(
        &collaborators.signer,
        person.as_ref().and_then(|p| p.s3_key.as_deref()),
    );

    Ok(RecognizeResponse {
        matched: true,
        note,
        similarity: Some(found.similarity),
        person: Some(RecognizedPerson {
            person_id: found.external_id,
            name: subject.name,
            relationship: subject.relationship,
            age: person.as_ref().and_then(|p| p.age),
            notes: subject.notes,
            photo_url,
        }),
        audio,
        audio_format,
    })
}

/// Speech failures degrade to a text-only announcement.
async fn speak(speech: &dyn SpeechSynthesizer, note: &str) -> (Option<String>, Option<String>) {
    match speech.synthesize(note).await {
        Ok(audio) => (
            Some(STANDARD.encode(audio)),
            Some(speech.audio_format().to_string()),
        ),
        Err(e) => {
            warn!("Speech synthesis failed, answering with text only: {e}");
            (None, None)
        }
    }
}
