//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use gfm_rs::assistant::Assistant;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::api::{self, AppState};

/// Build the full axum router.
///
/// The router serves:
/// - `/health`
/// - `/chat` and the REST API at `/api/*`
/// - Optional static files for the frontend production build
pub fn build_router(
    assistant: Arc<Assistant>,
    cors_origins: &[String],
    static_dir: Option<PathBuf>,
) -> Router {
    let state = AppState { assistant };

    let mut router = Router::new()
        .route("/health", get(api::health))
        .route("/chat", post(api::post_chat))
        .route("/api/capabilities", get(api::get_capabilities))
        .route("/api/query", post(api::post_query))
        .route("/api/explain", post(api::post_explain))
        .route("/api/compare", post(api::post_compare))
        .with_state(state)
        .layer(cors_layer(cors_origins));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
}

/// CORS for the frontend dev servers. Credentials are allowed, so origins
/// are listed explicitly and methods/headers mirror the preflight request.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Bind the listener, spawn the server, and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("listening on http://{addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("server error: {e}");
        }
    });

    Ok(addr)
}
