use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::collaborators::Collaborators;
use http::{HeaderValue, header};
use std::iter::once;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{self, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Connect every collaborator from settings and serve on `api.host:api.port`.
pub async fn serve(settings: AppSettings) -> Result<()> {
    info!("🚀 Initializing server...");
    let collaborators = Collaborators::from_settings(&settings).await?;
    // The server still starts when a collaborator is down, /health must answer regardless.
    if let Err(e) = collaborators.ensure_ready().await {
        warn!("Not every collaborator is ready: {e:?}");
    }

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let listener = TcpListener::bind(addr).await?;
    info!("🎙️ Server listening on http://{}", addr);

    serve_on(
        listener,
        ApiContext {
            collaborators,
            settings,
        },
    )
    .await
}

/// Serve the app on an already bound listener until the process stops.
pub async fn serve_on(listener: TcpListener, context: ApiContext) -> Result<()> {
    axum::serve(listener, build_app(context)).await?;
    Ok(())
}

fn cors_layer(settings: &AppSettings) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(cors::Any).allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
        header::USER_AGENT,
        header::CACHE_CONTROL,
    ]);
    // The mobile app and the camera page run on arbitrary origins by default.
    if settings.api.allowed_origins.is_empty() {
        return cors.allow_origin(cors::Any);
    }

    let allowed_origins: Vec<HeaderValue> = settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();
    cors.allow_origin(allowed_origins)
}

/// The full router with middleware, ready to serve.
pub fn build_app(context: ApiContext) -> Router {
    let cors = cors_layer(&context.settings);
    let body_limit = context.settings.api.max_body_mb * 1024 * 1024;

    create_router(context)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetSensitiveRequestHeadersLayer::new(once(
            header::AUTHORIZATION,
        )))
}
