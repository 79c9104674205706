//! Tracing setup for host processes

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-oriented output
    Pretty,
    /// Single-line default formatter
    Full,
    /// Newline-delimited JSON
    Json,
}

impl LogFormat {
    /// Unrecognized names fall back to `Pretty`
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "full" => LogFormat::Full,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber described by `config`
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let format = LogFormat::parse(&config.format);
    let pretty = (format == LogFormat::Pretty).then(|| fmt::layer().pretty());
    let full = (format == LogFormat::Full).then(|| fmt::layer());
    let json = (format == LogFormat::Json).then(|| fmt::layer().json());

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(pretty)
        .with(full)
        .with(json)
        .try_init()?;

    tracing::debug!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("full"), LogFormat::Full);
        assert_eq!(LogFormat::parse("verbose"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(&LoggingConfig::default().format), LogFormat::Pretty);
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };

        let _ = init(&config);
        assert!(matches!(init(&config), Err(LoggingError::Init(_))));
    }
}
