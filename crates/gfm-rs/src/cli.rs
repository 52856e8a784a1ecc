//! Command-line flags shared by the `gfm` and `gfm-web` binaries.
//!
//! Each flag can also be set through the environment variable named in its
//! help text, so a `.env` file is enough to point both binaries at a backend.

use std::time::Duration;

use clap::Args;

use crate::gateway::{GatewayConfig, GenerationParams, RetryPolicy};
use crate::logging::LoggingConfig;
use crate::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Inference backend connection flags.
#[derive(Args, Debug, Clone)]
pub struct GatewayArgs {
    /// Base URL of the OpenAI-compatible API (e.g. http://localhost:8001/v1)
    #[arg(long = "llm-base-url", env = "GFM_LLM_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token for the backend, if it requires one
    #[arg(long = "llm-api-key", env = "GFM_LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name to request
    #[arg(long, env = "GFM_LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Maximum tokens in the reply
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Retries for transient backend failures (429, 5xx, timeouts)
    #[arg(long, default_value_t = 0)]
    pub retries: u32,
}

impl GatewayArgs {
    pub fn to_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            params: GenerationParams {
                model: self.model.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy::retries(self.retries),
        }
    }
}

/// Logging flags.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, env = "GFM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format: "pretty" or "json"
    #[arg(long, env = "GFM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl LogArgs {
    pub fn to_config(&self) -> LoggingConfig {
        LoggingConfig::new(&self.log_level, &self.log_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        gateway: GatewayArgs,
        #[command(flatten)]
        log: LogArgs,
    }

    #[test]
    fn gateway_flags_map_to_config() {
        let cli = TestCli::parse_from([
            "test",
            "--llm-base-url",
            "http://localhost:8001/v1",
            "--model",
            "gfm-assistant",
            "--temperature",
            "0.2",
            "--retries",
            "2",
        ]);
        let config = cli.gateway.to_config();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8001/v1"));
        assert_eq!(config.params.model, "gfm-assistant");
        assert!((config.params.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.params.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.retry.retries, 2);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn log_flags_default() {
        let cli = TestCli::parse_from(["test", "--log-format", "json"]);
        let config = cli.log.to_config();
        assert_eq!(config.format, "json");
    }
}
