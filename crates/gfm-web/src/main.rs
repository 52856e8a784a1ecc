//! GFM assistant backend server.
//!
//! Serves the REST API the dashboard frontend talks to and forwards chat
//! turns to an OpenAI-compatible inference backend.
//!
//! # Usage
//!
//! ```bash
//! GFM_LLM_BASE_URL=http://localhost:8001/v1 cargo run -p gfm-web
//! cargo run -p gfm-web -- --port 8080 --model gfm-assistant
//! cargo run -p gfm-web -- --static-dir ./dist
//! ```
//!
//! The server starts even without a backend configured; `/chat` then
//! answers 503 until `GFM_LLM_BASE_URL` points somewhere real.
//!
//! ```bash
//! curl -X POST localhost:8000/api/query -H 'content-type: application/json' -d '{
//!   "taskType": "EFP", "chromosome": "7", "start": 1000000, "end": 1050000,
//!   "cellType": "K562", "modalities": ["Additional TF-bindings"]
//! }'
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use gfm_rs::cli::{GatewayArgs, LogArgs};
use gfm_rs::prelude::*;
use gfm_web::{DEFAULT_CORS_ORIGINS, WebConfig, spawn_web};
use tracing::{info, warn};

/// GFM assistant backend server.
#[derive(Parser)]
#[command(name = "gfm-web", version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "GFM_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "GFM_PORT", default_value_t = 8000)]
    port: u16,

    /// Allowed CORS origin (repeatable). Defaults to the local dev servers.
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Serve the built frontend from this directory
    #[arg(long)]
    static_dir: Option<PathBuf>,

    #[command(flatten)]
    gateway: GatewayArgs,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    args.log.to_config().init();

    let gateway_config = args.gateway.to_config();
    if let Err(e) = gateway_config.validated_base_url() {
        warn!("{e}; chat endpoints will answer 503 until it is configured");
    }
    let assistant = Assistant::new(LazyGateway::new(gateway_config));

    let cors_origins = if args.cors_origins.is_empty() {
        DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
    } else {
        args.cors_origins
    };

    let config = WebConfig {
        bind_addr: (args.host, args.port).into(),
        cors_origins,
        static_dir: args.static_dir,
    };

    let addr = spawn_web(assistant, config).await?;
    info!("GFM backend ready at http://{addr}");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
