mod api_doc;
pub mod extract;
pub mod media;
pub mod people;
pub mod recognize;
pub mod root;
pub mod storage;

use crate::api_state::ApiContext;
use crate::media::router::media_router;
use crate::people::router::people_router;
use crate::recognize::router::recognize_router;
use crate::root::router::root_router;
use crate::storage::router::storage_router;
use axum::Router;

pub use api_doc::ApiDoc;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    Router::new()
        .merge(root_router())
        .merge(recognize_router())
        .merge(people_router())
        .merge(media_router())
        .merge(storage_router())
        .with_state(api_state)
}
