use crate::api_state::ApiContext;
use crate::extract::JsonBody;
use axum::Json;
use axum::extract::State;
use common_services::api::recognize::error::RecognizeError;
use common_services::api::recognize::interfaces::{RecognizeRequest, RecognizeResponse};
use common_services::api::recognize::service::recognize_face;

/// Recognize the face in a camera frame and announce who it is.
///
/// Frames without a face or without a close enough match answer `matched: false`.
#[utoipa::path(
    post,
    path = "/recognize",
    tag = "Recognition",
    request_body = RecognizeRequest,
    responses(
        (status = 200, description = "Match result with the announcement and optional speech.", body = RecognizeResponse),
        (status = 400, description = "Missing or undecodable image."),
        (status = 500, description = "The face service or the record store failed."),
    )
)]
pub async fn recognize_handler(
    State(context): State<ApiContext>,
    JsonBody(payload): JsonBody<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, RecognizeError> {
    let response = recognize_face(
        &context.collaborators,
        &context.settings,
        payload.image.as_deref(),
    )
    .await?;
    Ok(Json(response))
}
