//! Convenience re-exports for common `gfm-rs` types.
//!
//! ```ignore
//! use gfm_rs::prelude::*;
//! ```
//!
//! Pulls in the request pipeline, message types, the assistant, and the
//! gateway handles. Individual template functions stay in
//! [`templates`](crate::templates).

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{Message, MessageRole, OpenAiClient, json_schema_for};

// ── Pipeline ────────────────────────────────────────────────────────
pub use crate::assistant::Assistant;
pub use crate::capabilities::{Capabilities, capabilities};
pub use crate::messages::assemble;
pub use crate::request::{FormattedQuery, PredictionRequest};
pub use crate::templates::{PredictionResult, ResultRegion, TaskType, get_template_for_task};
pub use crate::validation::GenomicRegion;

// ── Gateway ─────────────────────────────────────────────────────────
pub use crate::gateway::{
    GatewayConfig, GenerationParams, InferenceGateway, LazyGateway, RetryPolicy,
};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{GatewayError, GfmError, ValidationError};
