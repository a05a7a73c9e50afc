use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

/// `Json` whose rejection is a JSON `{"error": ...}` body like every other error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(BadJson))]
pub struct JsonBody<T>(pub T);

pub struct BadJson(JsonRejection);

impl From<JsonRejection> for BadJson {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection)
    }
}

impl IntoResponse for BadJson {
    fn into_response(self) -> Response {
        let message = self.0.body_text();
        warn!("Rejected request body: {}", message);
        let status = match self.0.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
