use crate::api_state::ApiContext;
use crate::recognize::handlers::recognize_handler;
use axum::{Router, routing::post};

pub fn recognize_router() -> Router<ApiContext> {
    Router::new().route("/recognize", post(recognize_handler))
}
