//! Error types for the formatting pipeline and the inference gateway.
//!
//! Three conditions are kept apart so callers can tell "fix your input"
//! ([`ValidationError`]) from "service unavailable"
//! ([`GatewayError::Unconfigured`]) from "unexpected failure"
//! ([`GatewayError::CallFailed`]). None of them are retried here.

use thiserror::Error;

use crate::config::MAX_REGION_SIZE_KB;

/// A genomic region failed domain validation.
///
/// Always produced before any formatting work or network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Chromosome is not one of `1`..`22`, `X`, `Y`.
    #[error("invalid chromosome '{chromosome}': must be one of {allowed}")]
    InvalidChromosome {
        /// The rejected chromosome name.
        chromosome: String,
        /// Comma-separated allowed set.
        allowed: String,
    },

    /// Region spans more than the configured maximum.
    #[error("region size {size_bp} bp exceeds the maximum of {max_kb}kb")]
    RegionTooLarge {
        /// `end - start` in base pairs.
        size_bp: i64,
        /// The configured bound in kilobases.
        max_kb: i64,
    },

    /// Coordinates do not describe a non-empty region starting at or after 0.
    #[error("invalid coordinates {start}-{end}: start must be >= 0 and end must be greater than start")]
    InvalidCoordinates { start: i64, end: i64 },
}

impl ValidationError {
    pub(crate) fn region_too_large(size_bp: i64) -> Self {
        ValidationError::RegionTooLarge {
            size_bp,
            max_kb: MAX_REGION_SIZE_KB,
        }
    }

    /// Short machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidChromosome { .. } => "invalid_chromosome",
            ValidationError::RegionTooLarge { .. } => "region_too_large",
            ValidationError::InvalidCoordinates { .. } => "invalid_coordinates",
        }
    }
}

/// Why a call to the inference backend failed.
#[derive(Error, Debug)]
pub enum CallFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend error: {0}")]
    Api(String),

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend returned no reply text")]
    EmptyReply,
}

impl CallFailure {
    /// Whether retrying the same request might succeed.
    ///
    /// Rate limits, 5xx responses, and connection/timeout errors are
    /// transient. Every other 4xx, decode failures, and empty replies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            CallFailure::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CallFailure::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            CallFailure::Api(_) | CallFailure::Decode(_) | CallFailure::EmptyReply => false,
        }
    }
}

/// Failure at the inference gateway boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Endpoint missing or still set to a placeholder. Detected at first use.
    #[error("inference service is not configured: {0}")]
    Unconfigured(String),

    /// The backend call itself failed. The cause is kept for diagnostics.
    #[error("inference call failed: {0}")]
    CallFailed(#[from] CallFailure),
}

/// Any error surfaced by the assistant pipeline.
#[derive(Error, Debug)]
pub enum GfmError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl GfmError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GfmError::Validation(_))
    }
}
