use super::{FaceCollection, FaceCollectionError, FaceMatch, IndexedFace};
use app_state::RecognitionSettings;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Serialize)]
struct SearchRequest<'a> {
    image: &'a str,
    threshold: f32,
    max_faces: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    matches: Vec<FaceMatch>,
}

#[derive(Serialize)]
struct IndexRequest<'a> {
    image: &'a str,
    external_id: &'a str,
    max_faces: u32,
}

#[derive(Deserialize)]
struct FacesResponse {
    faces: Vec<IndexedFace>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    face_ids: &'a [String],
}

#[derive(Deserialize)]
struct DeleteResponse {
    deleted: Vec<String>,
}

/// REST client for the managed face collection service.
#[derive(Clone)]
pub struct HttpFaceCollection {
    http: Client,
    endpoint: String,
    collection_id: String,
    api_key: Option<String>,
}

impl HttpFaceCollection {
    pub fn new(settings: &RecognitionSettings, api_key: &str) -> Result<Self, FaceCollectionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            collection_id: settings.collection_id.clone(),
            api_key: Some(api_key.to_string()).filter(|k| !k.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/collections/{}{path}",
            self.endpoint, self.collection_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Maps non-success statuses to errors. 422 means the service found no face.
    async fn check(response: Response) -> Result<Response, FaceCollectionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNPROCESSABLE_ENTITY => FaceCollectionError::NoFaceDetected,
            StatusCode::BAD_REQUEST => FaceCollectionError::InvalidImage(body),
            _ => FaceCollectionError::Api { status, body },
        })
    }
}

#[async_trait]
impl FaceCollection for HttpFaceCollection {
    async fn ensure_collection(&self) -> Result<(), FaceCollectionError> {
        let response = self
            .authorized(self.http.put(self.url("")))
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            info!("Face collection {} already exists", self.collection_id);
            return Ok(());
        }
        Self::check(response).await?;
        info!("Created face collection {}", self.collection_id);
        Ok(())
    }

    async fn search(
        &self,
        image: &[u8],
        threshold: f32,
    ) -> Result<Option<FaceMatch>, FaceCollectionError> {
        let encoded = STANDARD.encode(image);
        let body = SearchRequest {
            image: &encoded,
            threshold,
            max_faces: 1,
        };
        let response = self
            .authorized(self.http.post(self.url("/search")))
            .json(&body)
            .send()
            .await?;
        let result: SearchResponse = Self::check(response).await?.json().await?;
        debug!("Face search returned {} matches", result.matches.len());

        Ok(result
            .matches
            .into_iter()
            .filter(|m| m.similarity >= threshold)
            .max_by(|a, b| a.similarity.total_cmp(&b.similarity)))
    }

    async fn index(
        &self,
        image: &[u8],
        external_id: &str,
    ) -> Result<Option<IndexedFace>, FaceCollectionError> {
        let encoded = STANDARD.encode(image);
        let body = IndexRequest {
            image: &encoded,
            external_id,
            max_faces: 1,
        };
        let response = self
            .authorized(self.http.post(self.url("/faces")))
            .json(&body)
            .send()
            .await?;
        let result = match Self::check(response).await {
            Ok(response) => response.json::<FacesResponse>().await?,
            Err(FaceCollectionError::NoFaceDetected) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(result.faces.into_iter().next())
    }

    async fn list_faces(
        &self,
        external_id: Option<&str>,
    ) -> Result<Vec<IndexedFace>, FaceCollectionError> {
        let mut request = self.http.get(self.url("/faces"));
        if let Some(external_id) = external_id {
            request = request.query(&[("external_id", external_id)]);
        }
        let response = self.authorized(request).send().await?;
        let result: FacesResponse = Self::check(response).await?.json().await?;
        Ok(result.faces)
    }

    async fn delete_faces(&self, face_ids: &[String]) -> Result<usize, FaceCollectionError> {
        if face_ids.is_empty() {
            return Ok(0);
        }
        let response = self
            .authorized(self.http.post(self.url("/faces/delete")))
            .json(&DeleteRequest { face_ids })
            .send()
            .await?;
        let result: DeleteResponse = Self::check(response).await?.json().await?;
        Ok(result.deleted.len())
    }
}
