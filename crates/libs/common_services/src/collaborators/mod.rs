//! External services the backend delegates to, each behind a trait with a
//! network implementation and an in-memory one.

pub mod face_collection;
pub mod object_store;
pub mod rephrase;
pub mod speech;

pub use face_collection::*;
pub use object_store::*;
pub use rephrase::*;
pub use speech::*;

use crate::database::{MemoryPersonStore, PersonStore, PgPersonStore, get_db_pool};
use crate::utils::new_id;
use app_state::{AppSettings, DatabaseBackend, FaceBackend, StorageBackend};
use color_eyre::eyre::{Context, Result};
use language_model::ChatClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Every collaborator a request may need, shared across handlers.
#[derive(Clone)]
pub struct Collaborators {
    pub faces: Arc<dyn FaceCollection>,
    pub objects: Arc<dyn ObjectStore>,
    pub people: Arc<dyn PersonStore>,
    pub rephraser: Option<Arc<dyn NoteRephraser>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub signer: UrlSigner,
    /// Serializes the search-then-write sequence of enrollment.
    pub enrollment_lock: Arc<Mutex<()>>,
}

impl Collaborators {
    /// Build collaborators from explicit parts. Used by tests and tools.
    #[must_use]
    pub fn new(
        faces: Arc<dyn FaceCollection>,
        objects: Arc<dyn ObjectStore>,
        people: Arc<dyn PersonStore>,
        signer: UrlSigner,
    ) -> Self {
        Self {
            faces,
            objects,
            people,
            rephraser: None,
            speech: None,
            signer,
            enrollment_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_rephraser(mut self, rephraser: Arc<dyn NoteRephraser>) -> Self {
        self.rephraser = Some(rephraser);
        self
    }

    #[must_use]
    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Select and construct every backend as configured.
    ///
    /// # Errors
    ///
    /// Fails when the database URL is malformed or an HTTP client can't be built.
    /// The database itself is only contacted by `ensure_ready` and later queries.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self> {
        let faces: Arc<dyn FaceCollection> = match settings.recognition.backend {
            FaceBackend::Http => Arc::new(
                HttpFaceCollection::new(
                    &settings.recognition,
                    &settings.secrets.face_service_api_key,
                )
                .wrap_err("Failed to build face collection client")?,
            ),
            FaceBackend::Memory => {
                warn!("Using in-memory face collection, enrolled faces are lost on restart.");
                Arc::new(MemoryFaceCollection::new())
            }
        };

        let objects: Arc<dyn ObjectStore> = match settings.storage.backend {
            StorageBackend::Local => Arc::new(LocalObjectStore::new(&settings.storage.root)),
            StorageBackend::Memory => Arc::new(MemoryObjectStore::new()),
        };

        let people: Arc<dyn PersonStore> = match settings.database.backend {
            DatabaseBackend::Postgres => {
                let pool = get_db_pool(&settings.secrets.database_url, &settings.database)?;
                Arc::new(PgPersonStore::new(pool))
            }
            DatabaseBackend::Memory => Arc::new(MemoryPersonStore::new()),
        };

        let secret = if settings.secrets.presign_secret.is_empty() {
            warn!("No presign secret configured, storage links won't survive a restart.");
            format!("{}{}", new_id(), new_id())
        } else {
            settings.secrets.presign_secret.clone()
        };
        let signer = UrlSigner::new(
            &settings.api.public_url,
            secret.as_bytes(),
            settings.storage.presign_expiry_minutes,
        );

        let mut collaborators = Self::new(faces, objects, people, signer);

        if settings.text_generation_configured() {
            let text = &settings.text_generation;
            let client = ChatClient::with_base_url(&text.base_url)
                .model(text.model.clone())
                .api_key(settings.secrets.text_generation_api_key.clone())
                .temperature(text.temperature)
                .max_tokens(text.max_tokens)
                .timeout(Duration::from_secs(text.request_timeout_seconds))
                .build()
                .wrap_err("Failed to build text generation client")?;
            info!("Note rephrasing through {}", text.base_url);
            collaborators =
                collaborators.with_rephraser(Arc::new(LanguageModelRephraser::new(client)));
        }

        if settings.speech_configured() {
            let speech = HttpSpeechSynthesizer::new(
                &settings.speech,
                &settings.secrets.speech_api_key,
                &settings.secrets.voice_id,
            )
            .wrap_err("Failed to build speech client")?;
            info!("Speech synthesis through {}", settings.speech.base_url);
            collaborators = collaborators.with_speech(Arc::new(speech));
        } else {
            warn!("Speech synthesis is not configured, announcements will be text only.");
        }

        Ok(collaborators)
    }

    /// Provision every backend: face collection, storage root and schema.
    ///
    /// # Errors
    ///
    /// Returns the first provisioning step that fails.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.faces
            .ensure_collection()
            .await
            .wrap_err("Failed to create face collection")?;
        self.objects
            .ensure_ready()
            .await
            .wrap_err("Failed to prepare object storage")?;
        self.people
            .ensure_schema()
            .await
            .wrap_err("Failed to prepare the person table")?;
        Ok(())
    }
}
