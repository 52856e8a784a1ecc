//! Prompt construction and LLM forwarding for the Genomic Foundation Model
//! (GFM) assistant.
//!
//! `gfm-rs` sits between a web client and an OpenAI-compatible inference
//! server. It turns structured prediction parameters (task type, genomic
//! region, cell type, modalities) into a validated, deterministic message
//! sequence and forwards it to the backend.
//!
//! # Pipeline
//!
//! ```text
//! PredictionRequest ─▶ validation ─▶ templates ─▶ messages::assemble ─▶ InferenceGateway
//!                      (region)      (query)      (system prompt)       (OpenAiClient)
//! ```
//!
//! # Getting started
//!
//! ```ignore
//! use gfm_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GfmError> {
//!     let config = GatewayConfig::from_env();
//!     let assistant = Assistant::new(LazyGateway::new(config));
//!
//!     let request = PredictionRequest {
//!         task_type: "EFP".into(),
//!         chromosome: "7".into(),
//!         start: 1_000_000,
//!         end: 1_050_000,
//!         cell_type: "K562".into(),
//!         ..Default::default()
//!     };
//!
//!     let reply = assistant.predict(&request, vec![]).await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Allowed chromosomes, region bound, task codes, modality catalog |
//! | [`validation`] | [`GenomicRegion`](validation::GenomicRegion) and ordered region checks |
//! | [`templates`] | Query formatter, task templates, explanation/comparison requests |
//! | [`messages`] | System prompt injection for outgoing conversations |
//! | [`request`] | [`PredictionRequest`](request::PredictionRequest) wire shape and pipeline |
//! | [`gateway`] | [`InferenceGateway`](gateway::InferenceGateway) trait, config, lazy shared client, retry |
//! | [`assistant`] | [`Assistant`](assistant::Assistant) tying the pipeline to the gateway |
//! | [`capabilities`] | Static snapshot of what the system supports |

pub mod assistant;
pub mod capabilities;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod messages;
pub mod prelude;
pub mod prompt;
pub mod request;
pub mod templates;
pub mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::error::{CallFailure, GatewayError};
use crate::gateway::retry::RetryPolicy;
use crate::gateway::{GatewayConfig, GatewayFuture, GenerationParams, InferenceGateway};

// Re-export schemars for downstream crates.
pub use schemars;

// ── Constants ──────────────────────────────────────────────────────

/// Default model served by the inference backend.
pub const DEFAULT_MODEL: &str = "qwen3";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default request timeout for backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. Used to publish request shapes to the UI.
///
/// # Example
///
/// ```
/// use gfm_rs::json_schema_for;
/// use gfm_rs::request::PredictionRequest;
///
/// let schema = json_schema_for::<PredictionRequest>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"chromosome".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body in the OpenAI format. Zero-valued
/// generation parameters are omitted so the backend applies its own.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(messages: &[Message], params: &GenerationParams) -> Self {
        Self {
            model: params.model.clone(),
            messages: messages.to_vec(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<RawUsage>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token counts, logged and then dropped.
#[derive(Deserialize, Debug)]
struct RawUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Clean return type from [`OpenAiClient::send`].
#[derive(Debug, Default, PartialEq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    /// `"length"` means the reply hit `max_tokens` and was cut off.
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// The reply text. A missing or empty reply is a [`CallFailure::EmptyReply`].
    pub fn into_reply(self) -> Result<String, CallFailure> {
        if self.finish_reason.as_deref() == Some("length") {
            warn!("LLM reply truncated at max_tokens");
        }
        self.content
            .filter(|s| !s.is_empty())
            .ok_or(CallFailure::EmptyReply)
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) endpoint: String,
    pub(crate) api_key: Option<String>,
    pub(crate) retry: RetryPolicy,
}

impl OpenAiClient {
    /// Build a client from a gateway config.
    ///
    /// Fails with [`GatewayError::Unconfigured`] when the base URL is unset
    /// or still a placeholder. No network traffic happens here.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = config.validated_base_url()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("gfm-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unconfigured(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            retry: config.retry.clone(),
        })
    }

    /// The full chat completions URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a single chat completion request. No retries.
    pub async fn send(&self, body: &ChatRequest) -> Result<ChatCompletion, CallFailure> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let mut req = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(CallFailure::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawChatResponse = serde_json::from_str(&text)?;

        if let Some(err) = parsed.error {
            return Err(CallFailure::Api(err.message));
        }

        if let Some(usage) = &parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        match parsed.choices.and_then(|c| c.into_iter().next()) {
            Some(c) => Ok(ChatCompletion {
                content: c.message.content,
                finish_reason: c.finish_reason,
            }),
            None => {
                debug!("LLM output: empty (no choices)");
                Ok(ChatCompletion::default())
            }
        }
    }

    /// Send, retrying per the configured [`RetryPolicy`], and return the reply text.
    async fn send_with_retry(&self, body: &ChatRequest) -> Result<String, CallFailure> {
        let mut retries_done = 0;
        loop {
            let failure = match self.send(body).await.and_then(ChatCompletion::into_reply) {
                Ok(reply) => return Ok(reply),
                Err(e) => e,
            };
            let Some(delay) = self.retry.backoff(&failure, retries_done) else {
                return Err(failure);
            };
            retries_done += 1;
            warn!(
                "LLM call failed ({failure}), retrying in {:.1}s ({retries_done}/{})",
                delay.as_secs_f64(),
                self.retry.retries
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl InferenceGateway for OpenAiClient {
    fn chat<'a>(&'a self, messages: &'a [Message], params: &'a GenerationParams) -> GatewayFuture<'a> {
        Box::pin(async move {
            let body = ChatRequest::new(messages, params);
            Ok(self.send_with_retry(&body).await?)
        })
    }
}
