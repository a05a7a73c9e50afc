use crate::api_state::ApiContext;
use crate::media::handlers::{add_media_handler, delete_media_handler, list_media_handler};
use axum::{
    Router,
    routing::{delete, get},
};

pub fn media_router() -> Router<ApiContext> {
    Router::new()
        .route(
            "/person/{person_id}/media",
            get(list_media_handler).post(add_media_handler),
        )
        .route(
            "/person/{person_id}/media/{media_id}",
            delete(delete_media_handler),
        )
}
