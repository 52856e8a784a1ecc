//! Inference gateway: the boundary to the chat-completion backend.
//!
//! - [`InferenceGateway`]: send ordered role/content pairs, get one reply.
//!   [`OpenAiClient`](crate::OpenAiClient) is the production implementation.
//! - [`GatewayConfig`]: endpoint, credentials, generation parameters,
//!   timeout, and retry policy.
//! - [`LazyGateway`]: the process-wide client handle, built on first use
//!   exactly once and shared read-only afterwards.
//! - [`retry`]: backoff policy for transient backend failures.

pub mod retry;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, Message, OpenAiClient};

pub use retry::RetryPolicy;

/// Environment variable holding the backend base URL (e.g. `http://localhost:8001/v1`).
pub const BASE_URL_ENV: &str = "GFM_LLM_BASE_URL";
/// Environment variable holding the optional bearer token.
pub const API_KEY_ENV: &str = "GFM_LLM_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "GFM_LLM_MODEL";

/// Boxed future returned by [`InferenceGateway::chat`].
pub type GatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>>;

/// A chat-completion backend.
///
/// Implementations send the messages in order and return the reply text.
/// Configuration problems surface as [`GatewayError::Unconfigured`]; any
/// other failure as [`GatewayError::CallFailed`].
pub trait InferenceGateway: Send + Sync {
    fn chat<'a>(&'a self, messages: &'a [Message], params: &'a GenerationParams) -> GatewayFuture<'a>;
}

/// Model selection and sampling settings sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Connection settings for the inference backend.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub params: GenerationParams,
    /// Per-request timeout. Bounds how long a caller can wait on the backend.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            params: GenerationParams::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Substrings that mark a URL as an unfilled template value.
const PLACEHOLDER_MARKERS: [&str; 5] = ["your-", "<", "example.com", "changeme", "placeholder"];

/// Whether `url` cannot possibly point at a real backend.
pub fn is_placeholder_url(url: &str) -> bool {
    let url = url.trim();
    let lower = url.to_lowercase();
    url.is_empty()
        || !(lower.starts_with("http://") || lower.starts_with("https://"))
        || PLACEHOLDER_MARKERS.iter().any(|m| lower.contains(m))
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Read [`BASE_URL_ENV`], [`API_KEY_ENV`], and [`MODEL_ENV`]. Missing
    /// variables leave the defaults in place; nothing is validated yet.
    pub fn from_env() -> Self {
        let mut config = Self {
            base_url: std::env::var(BASE_URL_ENV).ok(),
            api_key: std::env::var(API_KEY_ENV).ok(),
            ..Default::default()
        };
        if let Ok(model) = std::env::var(MODEL_ENV) {
            config.params.model = model;
        }
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The base URL, or [`GatewayError::Unconfigured`] if it is unset or a placeholder.
    pub fn validated_base_url(&self) -> Result<&str, GatewayError> {
        match self.base_url.as_deref() {
            None => Err(GatewayError::Unconfigured(format!(
                "{BASE_URL_ENV} is not set"
            ))),
            Some(url) if is_placeholder_url(url) => Err(GatewayError::Unconfigured(format!(
                "inference endpoint '{url}' looks like a placeholder"
            ))),
            Some(url) => Ok(url),
        }
    }
}

/// Process-wide inference client handle, initialized at most once.
///
/// The first [`get`](Self::get) validates the config and builds an
/// [`OpenAiClient`]; concurrent first callers wait on the same
/// initialization. A failed initialization leaves the cell empty and is
/// reported to that caller; it is not retried in the background.
pub struct LazyGateway {
    config: GatewayConfig,
    cell: OnceCell<Arc<dyn InferenceGateway>>,
}

impl LazyGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Use a prebuilt gateway instead of constructing an [`OpenAiClient`].
    pub fn with_gateway(config: GatewayConfig, gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            config,
            cell: OnceCell::new_with(Some(gateway)),
        }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.config.params
    }

    /// Whether the client has been built.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Return the shared client, building it on first use.
    pub async fn get(&self) -> Result<Arc<dyn InferenceGateway>, GatewayError> {
        self.cell
            .get_or_try_init(|| async {
                match OpenAiClient::new(&self.config) {
                    Ok(client) => {
                        info!(
                            endpoint = client.endpoint(),
                            model = %self.config.params.model,
                            "inference client initialized"
                        );
                        Ok(Arc::new(client) as Arc<dyn InferenceGateway>)
                    }
                    Err(e) => {
                        warn!("inference client not initialized: {e}");
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_urls_detected() {
        for url in [
            "",
            "   ",
            "localhost:8001",
            "https://your-inference-server/v1",
            "http://<host>:8000/v1",
            "https://api.example.com/v1",
            "http://CHANGEME/v1",
        ] {
            assert!(is_placeholder_url(url), "{url:?}");
        }
        assert!(!is_placeholder_url("http://localhost:8001/v1"));
        assert!(!is_placeholder_url("https://gpu-node-3.internal:8443/v1"));
    }

    #[test]
    fn unset_base_url_is_unconfigured() {
        let err = GatewayConfig::default().validated_base_url().unwrap_err();
        assert!(err.to_string().contains(BASE_URL_ENV));
    }

    #[test]
    fn builder_methods_apply() {
        let config = GatewayConfig::new("http://localhost:8001/v1")
            .with_api_key("sk-test")
            .with_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::retries(2));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.retries, 2);
        assert_eq!(config.params, GenerationParams::default());
    }

    #[tokio::test]
    async fn lazy_gateway_reports_unconfigured_and_stays_empty() {
        let gateway = LazyGateway::new(GatewayConfig::default());
        let result = gateway.get().await;
        assert!(matches!(result, Err(GatewayError::Unconfigured(_))));
        assert!(!gateway.is_initialized());
    }

    #[tokio::test]
    async fn lazy_gateway_initializes_once_under_concurrency() {
        let gateway = Arc::new(LazyGateway::new(GatewayConfig::new(
            "http://127.0.0.1:9/v1",
        )));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = gateway.clone();
                tokio::spawn(async move { gateway.get().await.map_err(|e| e.to_string()) })
            })
            .collect();

        let mut clients = Vec::new();
        for handle in handles {
            clients.push(handle.await.unwrap().unwrap());
        }

        assert!(gateway.is_initialized());
        let first = &clients[0];
        assert!(clients.iter().all(|c| Arc::ptr_eq(c, first)));
    }
}
