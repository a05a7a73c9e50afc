use crate::api_state::ApiContext;
use crate::extract::JsonBody;
use axum::Json;
use axum::extract::{Path, State};
use common_services::api::media::error::MediaError;
use common_services::api::media::interfaces::{
    AddMediaRequest, AddMediaResponse, DeleteMediaResponse, MediaListResponse,
};
use common_services::api::media::service::{add_media, delete_media, list_media};

#[utoipa::path(
    get,
    path = "/person/{person_id}/media",
    tag = "Media",
    params(
        ("person_id" = String, Path, description = "Id of the person.")
    ),
    responses(
        (status = 200, description = "Every photo of the person with presigned links.", body = MediaListResponse),
        (status = 404, description = "No such person."),
    )
)]
pub async fn list_media_handler(
    State(context): State<ApiContext>,
    Path(person_id): Path<String>,
) -> Result<Json<MediaListResponse>, MediaError> {
    Ok(Json(list_media(&context.collaborators, &person_id).await?))
}

/// Add photos to a person's gallery. Accepts `images` and/or a single `image`.
#[utoipa::path(
    post,
    path = "/person/{person_id}/media",
    tag = "Media",
    params(
        ("person_id" = String, Path, description = "Id of the person.")
    ),
    request_body = AddMediaRequest,
    responses(
        (status = 200, description = "Photos stored.", body = AddMediaResponse),
        (status = 400, description = "No images, or an image couldn't be decoded."),
        (status = 404, description = "No such person."),
    )
)]
pub async fn add_media_handler(
    State(context): State<ApiContext>,
    Path(person_id): Path<String>,
    JsonBody(payload): JsonBody<AddMediaRequest>,
) -> Result<Json<AddMediaResponse>, MediaError> {
    let response = add_media(
        &context.collaborators,
        &context.settings,
        &person_id,
        payload.into_images(),
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/person/{person_id}/media/{media_id}",
    tag = "Media",
    params(
        ("person_id" = String, Path, description = "Id of the person."),
        ("media_id" = String, Path, description = "Id of the photo.")
    ),
    responses(
        (status = 200, description = "Photo removed.", body = DeleteMediaResponse),
        (status = 404, description = "No such person or photo."),
    )
)]
pub async fn delete_media_handler(
    State(context): State<ApiContext>,
    Path((person_id, media_id)): Path<(String, String)>,
) -> Result<Json<DeleteMediaResponse>, MediaError> {
    Ok(Json(
        delete_media(&context.collaborators, &person_id, &media_id).await?,
    ))
}
