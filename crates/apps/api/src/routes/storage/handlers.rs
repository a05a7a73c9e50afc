use crate::api_state::ApiContext;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::Response;
use common_services::api::storage::error::StorageError;
use common_services::api::storage::service::fetch_object;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StorageQuery {
    /// Token from the presigned link.
    #[serde(default)]
    pub token: String,
}

/// Fetch a stored photo through a presigned link.
#[utoipa::path(
    get,
    path = "/storage/{key}",
    tag = "Storage",
    params(
        ("key" = String, Path, description = "Object key, e.g. `{person_id}/{media_id}.jpg`."),
        StorageQuery
    ),
    responses(
        (status = 200, description = "The object bytes.", content_type = "image/jpeg"),
        (status = 403, description = "Missing, expired or foreign token."),
        (status = 404, description = "The object doesn't exist."),
    )
)]
pub async fn fetch_object_handler(
    State(context): State<ApiContext>,
    Path(key): Path<String>,
    Query(query): Query<StorageQuery>,
) -> Result<Response<Body>, StorageError> {
    fetch_object(&context.collaborators, &key, &query.token).await
}
