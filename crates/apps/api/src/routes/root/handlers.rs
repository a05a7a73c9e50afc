use crate::ApiDoc;
use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `ok` or `unavailable`. Informational, the status stays healthy either way.
    pub database: &'static str,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    responses(
        (status = 200, description = "Service banner", body = String)
    )
)]
pub async fn root() -> &'static str {
    "Recall face recognition API"
}

/// Liveness probe. Always 200 so a flaky dependency doesn't take the process down.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "API is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(context): State<ApiContext>) -> Json<HealthResponse> {
    let database = match context.collaborators.people.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!("Health check: record store unavailable: {}", e);
            "unavailable"
        }
    };
    Json(HealthResponse {
        status: "healthy",
        database,
    })
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "System",
    responses(
        (status = 200, description = "OpenAPI document for this API")
    )
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
