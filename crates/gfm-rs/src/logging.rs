//! Logging configuration and initialization.
//!
//! Logs always go to stderr so that `gfm` output on stdout stays pipeable.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log output settings shared by the `gfm` and `gfm-web` binaries.
///
/// `RUST_LOG` takes precedence over [`level`](Self::level) when set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `"json"` for structured output; anything else is human-readable.
    pub format: String,
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: format.into(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Build the subscriber, writing to `writer` in the configured format.
    fn subscriber<W>(&self, writer: W) -> Box<dyn Subscriber + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let builder = fmt().with_env_filter(self.filter()).with_writer(writer);
        match self.format.as_str() {
            "json" => Box::new(builder.json().finish()),
            _ => Box::new(builder.finish()),
        }
    }

    /// Install the global subscriber. Call once, at startup.
    pub fn init(&self) {
        self.subscriber(std::io::stderr).init();
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info", "pretty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn defaults_to_info_pretty() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    /// In-memory stand-in for stderr.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn log_with(format: &str) -> String {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = LoggingConfig::new("info", format).subscriber(move || writer.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("region rejected");
        });
        sink.text()
    }

    #[test]
    fn json_format_uses_configured_writer() {
        let out = log_with("json");
        assert!(out.trim_start().starts_with('{'), "{out}");
        assert!(out.contains(r#""message":"region rejected""#), "{out}");
    }

    #[test]
    fn pretty_format_uses_configured_writer() {
        let out = log_with("pretty");
        assert!(out.contains("region rejected"), "{out}");
        assert!(!out.trim_start().starts_with('{'));
    }
}
