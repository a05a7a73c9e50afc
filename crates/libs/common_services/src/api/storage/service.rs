//! Serves objects behind presigned links.

use super::error::StorageError;
use crate::collaborators::Collaborators;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use tracing::{debug, instrument};

/// Verify the link's token and stream back the object it was issued for.
#[instrument(skip(collaborators, token))]
pub async fn fetch_object(
    collaborators: &Collaborators,
    key: &str,
    token: &str,
) -> Result<Response<Body>, StorageError> {
    collaborators.signer.verify(key, token)?;

    let Some(bytes) = collaborators.objects.get(key).await? else {
        return Err(StorageError::NotFound(key.to_string()));
    };
    let content_type = mime_guess::from_path(key).first_or_octet_stream();
    debug!("Serving {key} as {content_type} ({} bytes)", bytes.len());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(header::CACHE_CONTROL, "private, max-age=300")
        .body(Body::from(bytes))
        .map_err(|e| StorageError::Storage(std::io::Error::other(e).into()))
}
