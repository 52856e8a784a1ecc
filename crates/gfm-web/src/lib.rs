//! HTTP front for the GFM assistant.
//!
//! `gfm-web` exposes the [`gfm_rs`] pipeline over a small axum REST API for
//! the dashboard frontend. Every handler is stateless apart from the shared
//! [`Assistant`], whose gateway client is built on the first request that
//! needs it.
//!
//! # Quick start
//!
//! ```ignore
//! use gfm_rs::prelude::*;
//! use gfm_web::{WebConfig, spawn_web};
//!
//! let assistant = Assistant::new(LazyGateway::new(GatewayConfig::from_env()));
//! let addr = spawn_web(assistant, WebConfig::default()).await?;
//! println!("GFM backend: http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/health` | Liveness |
//! | GET | `/api/capabilities` | Task types, modality catalog, constraints |
//! | POST | `/api/query` | Validate and format a prediction query (no LLM call) |
//! | POST | `/chat` | Conversation turn, optionally built from a prediction query |
//! | POST | `/api/explain` | Explain one prediction result |
//! | POST | `/api/compare` | Compare several prediction results |
//!
//! Errors are JSON bodies `{"error": kind, "message": text}`: 400 for
//! invalid input, 503 when the backend is not configured, 502 when the
//! backend call fails.

mod api;
mod error;
mod server;

pub use error::ApiError;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use gfm_rs::assistant::Assistant;

/// Frontend dev-server origins allowed by default.
pub const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8000`.
    pub bind_addr: SocketAddr,
    /// Origins allowed to call the API with credentials.
    pub cors_origins: Vec<String>,
    /// Directory with the built frontend. If `None`, only the API is served.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// Binding to port 0 picks a free port. The server runs until the Tokio
/// runtime shuts down.
pub async fn spawn_web(assistant: Assistant, config: WebConfig) -> std::io::Result<SocketAddr> {
    let router = server::build_router(Arc::new(assistant), &config.cors_origins, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
