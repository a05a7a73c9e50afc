//! Stand-ins for the speech, chat completion and face collection services,
//! served over real HTTP.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::error;

pub const MOCK_AUDIO: &[u8] = b"ID3-mock-mp3-audio";
pub const MOCK_REPHRASED: &str = "They bring you flowers every Sunday.";
/// Images the mock face service answers 422 (no face) and 400 (unreadable) for.
pub const NO_FACE_IMAGE: &[u8] = b"landscape without people";
pub const CORRUPT_IMAGE: &[u8] = b"corrupt";
/// Similarity reported for a face indexed from the exact same image, and for any other face.
pub const SAME_IMAGE_SIMILARITY: f32 = 99.5;
pub const OTHER_IMAGE_SIMILARITY: f32 = 10.0;

#[derive(Default)]
pub struct MockRecorder {
    /// Text of every speech request, in order.
    pub spoken: Mutex<Vec<String>>,
    /// User prompt of every chat request, in order.
    pub prompts: Mutex<Vec<String>>,
}

impl MockRecorder {
    pub fn last_spoken(&self) -> Option<String> {
        self.spoken.lock().ok()?.last().cloned()
    }

    pub fn chat_calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

async fn text_to_speech(
    State(recorder): State<Arc<MockRecorder>>,
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if headers.get("xi-api-key").is_none() || voice_id.is_empty() {
        return (StatusCode::UNAUTHORIZED, Vec::new()).into_response();
    }
    let text = body["text"].as_str().unwrap_or_default().to_string();
    if let Ok(mut spoken) = recorder.spoken.lock() {
        spoken.push(text);
    }
    ([(header::CONTENT_TYPE, "audio/mpeg")], MOCK_AUDIO.to_vec()).into_response()
}

async fn chat_completions(
    State(recorder): State<Arc<MockRecorder>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let prompt = body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_string();
    if let Ok(mut prompts) = recorder.prompts.lock() {
        prompts.push(prompt);
    }
    Json(json!({
        "choices": [{ "message": { "role": "assistant", "content": MOCK_REPHRASED } }]
    }))
}

struct StoredFace {
    face_id: String,
    external_id: String,
    /// Base64 image the face was indexed from.
    image: String,
}

/// A face collection service keeping faces per collection in memory. Two
/// images are the same face only when their bytes are identical.
#[derive(Default)]
pub struct MockFaceService {
    collections: Mutex<HashMap<String, Vec<StoredFace>>>,
    next_face: AtomicUsize,
    /// `Authorization` header of every request, in order.
    pub authorizations: Mutex<Vec<Option<String>>>,
    /// JSON body of every search, index and delete request, in order.
    pub bodies: Mutex<Vec<Value>>,
}

impl MockFaceService {
    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().ok()?.last().cloned()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.authorizations.lock().ok()?.last().cloned().flatten()
    }

    fn record(&self, headers: &HeaderMap, body: Option<&Value>) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Ok(mut authorizations) = self.authorizations.lock() {
            authorizations.push(authorization);
        }
        if let (Some(body), Ok(mut bodies)) = (body, self.bodies.lock()) {
            bodies.push(body.clone());
        }
    }

    fn new_face_id(&self) -> String {
        format!("face-{}", self.next_face.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// The rejection the service gives for an image, if any.
fn reject_image(image: &str) -> Option<Response> {
    if image == STANDARD.encode(NO_FACE_IMAGE) {
        return Some((StatusCode::UNPROCESSABLE_ENTITY, "no face detected").into_response());
    }
    if image == STANDARD.encode(CORRUPT_IMAGE) {
        return Some((StatusCode::BAD_REQUEST, "unsupported image format").into_response());
    }
    None
}

fn unknown_collection(collection: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("collection {collection} not found")).into_response()
}

async fn create_collection(
    State(service): State<Arc<MockFaceService>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    service.record(&headers, None);
    let Ok(mut collections) = service.collections.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    if collections.contains_key(&collection) {
        return (StatusCode::CONFLICT, "collection exists").into_response();
    }
    collections.insert(collection.clone(), Vec::new());
    Json(json!({ "collection_id": collection })).into_response()
}

async fn search_faces(
    State(service): State<Arc<MockFaceService>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    service.record(&headers, Some(&body));
    let image = body["image"].as_str().unwrap_or_default();
    if let Some(rejection) = reject_image(image) {
        return rejection;
    }
    let Ok(collections) = service.collections.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(faces) = collections.get(&collection) else {
        return unknown_collection(&collection);
    };
    let matches: Vec<Value> = faces
        .iter()
        .map(|face| {
            let similarity = if face.image == image {
                SAME_IMAGE_SIMILARITY
            } else {
                OTHER_IMAGE_SIMILARITY
            };
            json!({
                "face_id": face.face_id,
                "external_id": face.external_id,
                "similarity": similarity,
            })
        })
        .collect();
    Json(json!({ "matches": matches })).into_response()
}

async fn index_face(
    State(service): State<Arc<MockFaceService>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    service.record(&headers, Some(&body));
    let image = body["image"].as_str().unwrap_or_default().to_string();
    if let Some(rejection) = reject_image(&image) {
        return rejection;
    }
    let face_id = service.new_face_id();
    let external_id = body["external_id"].as_str().unwrap_or_default().to_string();
    let Ok(mut collections) = service.collections.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(faces) = collections.get_mut(&collection) else {
        return unknown_collection(&collection);
    };
    faces.push(StoredFace {
        face_id: face_id.clone(),
        external_id: external_id.clone(),
        image,
    });
    Json(json!({ "faces": [{ "face_id": face_id, "external_id": external_id }] })).into_response()
}

#[derive(Deserialize)]
struct ListQuery {
    external_id: Option<String>,
}

async fn list_faces(
    State(service): State<Arc<MockFaceService>>,
    Path(collection): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    service.record(&headers, None);
    let Ok(collections) = service.collections.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(faces) = collections.get(&collection) else {
        return unknown_collection(&collection);
    };
    let faces: Vec<Value> = faces
        .iter()
        .filter(|face| {
            query
                .external_id
                .as_ref()
                .is_none_or(|external_id| &face.external_id == external_id)
        })
        .map(|face| json!({ "face_id": face.face_id, "external_id": face.external_id }))
        .collect();
    Json(json!({ "faces": faces })).into_response()
}

async fn delete_faces(
    State(service): State<Arc<MockFaceService>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    service.record(&headers, Some(&body));
    let requested: Vec<String> = body["face_ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let Ok(mut collections) = service.collections.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(faces) = collections.get_mut(&collection) else {
        return unknown_collection(&collection);
    };
    let deleted: Vec<String> = faces
        .iter()
        .filter(|face| requested.contains(&face.face_id))
        .map(|face| face.face_id.clone())
        .collect();
    faces.retain(|face| !deleted.contains(&face.face_id));
    Json(json!({ "deleted": deleted })).into_response()
}

fn face_service_router(service: Arc<MockFaceService>) -> Router {
    Router::new()
        .route("/collections/{collection}", put(create_collection))
        .route("/collections/{collection}/search", post(search_faces))
        .route(
            "/collections/{collection}/faces",
            post(index_face).get(list_faces),
        )
        .route("/collections/{collection}/faces/delete", post(delete_faces))
        .with_state(service)
}

/// Start the mock services on an ephemeral port, returning their base url.
pub async fn spawn_mock_services(
    recorder: Arc<MockRecorder>,
    face_service: Arc<MockFaceService>,
) -> color_eyre::Result<(String, JoinHandle<()>)> {
    let app = Router::new()
        .route("/v1/text-to-speech/{voice_id}", post(text_to_speech))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(recorder)
        .merge(face_service_router(face_service));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Mock services failed: {}", e);
        }
    });
    Ok((base_url, handle))
}
