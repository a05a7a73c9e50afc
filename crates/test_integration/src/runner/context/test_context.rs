use crate::runner::context::mock_services::{MockFaceService, MockRecorder, spawn_mock_services};
use api::api_state::ApiContext;
use app_state::{AppSettings, load_settings_from_path};
use color_eyre::eyre::{Result, eyre};
use common_services::collaborators::Collaborators;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tasks::task_runner::run_cleanup;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A live API on an ephemeral port, backed by in-memory faces and records, a
/// temporary object store and mock speech, chat and face collection services.
#[allow(dead_code)]
pub struct TestContext {
    pub settings: AppSettings,
    pub http_client: Client,
    /// Same collaborators the server uses, for arranging and inspecting state.
    pub collaborators: Collaborators,
    pub recorder: Arc<MockRecorder>,
    pub face_service: Arc<MockFaceService>,
    /// Base url of the mock services.
    pub mock_url: String,
    storage_dir: TempDir,
    api_handle: JoinHandle<()>,
    mock_handle: JoinHandle<()>,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        info!("Setting up test environment...");

        let settings_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets/settings.yaml")
            .canonicalize()?;
        let mut settings = load_settings_from_path(&settings_path, false)?;

        // 1. Mock collaborators
        let recorder = Arc::new(MockRecorder::default());
        let face_service = Arc::new(MockFaceService::default());
        let (mock_url, mock_handle) =
            spawn_mock_services(recorder.clone(), face_service.clone()).await?;
        settings.speech.base_url.clone_from(&mock_url);
        settings.text_generation.base_url.clone_from(&mock_url);

        // 2. Temporary object store and an ephemeral port
        let storage_dir = tempfile::tempdir()?;
        settings.storage.root = storage_dir.path().to_path_buf();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        settings.api.port = addr.port();
        settings.api.public_url = format!("http://{addr}");

        // 3. Serve
        let collaborators = Collaborators::from_settings(&settings).await?;
        collaborators.ensure_ready().await?;
        let context = ApiContext {
            collaborators: collaborators.clone(),
            settings: settings.clone(),
        };
        let api_handle = tokio::spawn(async move {
            if let Err(e) = api::serve_on(listener, context).await {
                error!("API server failed: {}", e);
            }
        });

        let http_client = Client::new();
        Self::wait_for_healthy_api(&settings, &http_client).await?;

        info!("Test environment is ready.");
        Ok(Self {
            settings,
            http_client,
            collaborators,
            recorder,
            face_service,
            mock_url,
            storage_dir,
            api_handle,
            mock_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api.public_url, path)
    }

    /// Remove every photo, record and face so tests don't see each other's people.
    pub async fn reset(&self) -> Result<()> {
        run_cleanup(&self.collaborators).await?;
        Ok(())
    }

    async fn wait_for_healthy_api(settings: &AppSettings, http_client: &Client) -> Result<()> {
        let health_url = format!("{}/health", &settings.api.public_url);
        for attempt in 1..=20 {
            match http_client.get(&health_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("API is healthy after {} attempt(s).", attempt);
                    return Ok(());
                }
                Ok(response) => warn!("Health check returned {}", response.status()),
                Err(e) => warn!("Health check failed: {:?}. Retrying...", e),
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(eyre!("API did not become healthy within the timeout period."))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.api_handle.abort();
        self.mock_handle.abort();
    }
}
