use crate::api_state::ApiContext;
use crate::storage::handlers::fetch_object_handler;
use axum::{Router, routing::get};

pub fn storage_router() -> Router<ApiContext> {
    Router::new().route("/storage/{*key}", get(fetch_object_handler))
}
