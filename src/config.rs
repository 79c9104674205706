//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::context::RetryPolicy;
use crate::history::HistoryConfig;
use crate::patterns::PatternConfig;
use crate::synergy::GeneratorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistorySection,

    #[serde(default)]
    pub patterns: PatternsSection,

    #[serde(default)]
    pub context: ContextSection,

    #[serde(default)]
    pub synergy: SynergySection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// History provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySection {
    #[serde(default = "default_history_url")]
    pub base_url: String,

    #[serde(default)]
    pub token: String,

    #[serde(default = "default_history_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_history_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_history_url() -> String {
    "http://localhost:8123/api".to_string()
}

fn default_history_timeout() -> u64 {
    10_000
}

fn default_history_ttl() -> u64 {
    3600 // 1 hour
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            base_url: default_history_url(),
            token: String::new(),
            request_timeout_ms: default_history_timeout(),
            cache_ttl_secs: default_history_ttl(),
        }
    }
}

impl HistorySection {
    pub fn client_config(&self) -> HistoryConfig {
        HistoryConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Pattern detector configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PatternsSection {
    #[serde(default = "default_min_days")]
    pub min_history_days: u32,

    #[serde(default = "default_max_days")]
    pub max_history_days: u32,
}

fn default_min_days() -> u32 {
    30
}

fn default_max_days() -> u32 {
    90
}

impl Default for PatternsSection {
    fn default() -> Self {
        Self {
            min_history_days: default_min_days(),
            max_history_days: default_max_days(),
        }
    }
}

impl PatternsSection {
    pub fn detector_config(&self) -> PatternConfig {
        PatternConfig {
            min_history_days: self.min_history_days,
            max_history_days: self.max_history_days,
        }
    }
}

/// Context enhancer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ContextSection {
    #[serde(default = "default_context_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_enrichment_timeout")]
    pub enrichment_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_base_delay_ms: u64,

    /// Base URL of the HTTP enrichment service; unset disables enrichment
    #[serde(default)]
    pub enrichment_url: Option<String>,
}

fn default_context_ttl() -> u64 {
    300 // 5 minutes
}

fn default_enrichment_timeout() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    1000
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_context_ttl(),
            enrichment_timeout_ms: default_enrichment_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_delay(),
            enrichment_url: None,
        }
    }
}

impl ContextSection {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(self.enrichment_timeout_ms),
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Synergy generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SynergySection {
    #[serde(default = "default_max_synergies")]
    pub max_synergies: usize,

    #[serde(default = "default_max_per_type")]
    pub max_per_type: usize,
}

fn default_max_synergies() -> usize {
    30
}

fn default_max_per_type() -> usize {
    5
}

impl Default for SynergySection {
    fn default() -> Self {
        Self {
            max_synergies: default_max_synergies(),
            max_per_type: default_max_per_type(),
        }
    }
}

impl SynergySection {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            max_synergies: self.max_synergies,
            max_per_type: self.max_per_type,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("synergy-engine").join("config.toml")),
            Some(PathBuf::from("/etc/synergy-engine/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in
    /// production, a map in tests)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SYNERGY_HISTORY_URL") {
            self.history.base_url = url;
        }
        if let Some(token) = lookup("SYNERGY_HISTORY_TOKEN") {
            self.history.token = token;
        }

        if let Some(url) = lookup("SYNERGY_ENRICHMENT_URL") {
            self.context.enrichment_url = Some(url).filter(|u| !u.is_empty());
        }

        if let Some(level) = lookup("SYNERGY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SYNERGY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Synergy Engine Configuration
#
# Environment variables override these settings:
# - SYNERGY_HISTORY_URL
# - SYNERGY_HISTORY_TOKEN
# - SYNERGY_ENRICHMENT_URL
# - SYNERGY_LOG_LEVEL
# - SYNERGY_LOG_FORMAT

[history]
# State-history API base URL
base_url = "http://localhost:8123/api"

# Long-lived bearer token (empty sends no Authorization header)
token = ""

# Per-request timeout (ms)
request_timeout_ms = 10000

# How long fetched history windows are reused (seconds)
cache_ttl_secs = 3600

[patterns]
# Lookbacks shorter than this are flagged as short-term
min_history_days = 30

# Default and maximum lookback
max_history_days = 90

[context]
# How long a context snapshot is reused (seconds)
cache_ttl_secs = 300

# Per-attempt enrichment timeout (ms)
enrichment_timeout_ms = 5000

# Retries after the first attempt, with exponential backoff
max_retries = 2
retry_base_delay_ms = 1000

# Enrichment service serving /weather, /pricing and /carbon
# enrichment_url = "http://localhost:8090"

[synergy]
# Maximum generated opportunities per call
max_synergies = 30

# Maximum devices considered per archetype
max_per_type = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (multi-line), full (single-line) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.history.base_url, "http://localhost:8123/api");
        assert_eq!(config.history.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.patterns.max_history_days, 90);
        assert_eq!(config.context.cache_ttl(), Duration::from_secs(300));
        assert!(config.context.enrichment_url.is_none());
        assert_eq!(config.synergy.max_synergies, 30);
        assert_eq!(config.logging.level, "info");

        let retry = config.context.retry_policy();
        assert_eq!(retry.timeout, Duration::from_secs(5));
        assert_eq!(retry.max_retries, 2);
        assert_eq!(retry.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[history]
base_url = "http://ha.local:8123/api"
token = "secret"

[context]
enrichment_url = "http://ctx.local"
max_retries = 0
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.history.base_url, "http://ha.local:8123/api");
        assert_eq!(config.history.token, "secret");
        assert_eq!(config.history.request_timeout_ms, 10_000);
        assert_eq!(config.context.enrichment_url.as_deref(), Some("http://ctx.local"));
        assert_eq!(config.context.max_retries, 0);
        assert_eq!(config.context.enrichment_timeout_ms, 5000);
        assert_eq!(config.synergy.max_per_type, 5);
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.history.base_url, defaults.history.base_url);
        assert_eq!(config.history.cache_ttl_secs, defaults.history.cache_ttl_secs);
        assert_eq!(config.patterns.min_history_days, defaults.patterns.min_history_days);
        assert_eq!(config.context.retry_base_delay_ms, defaults.context.retry_base_delay_ms);
        assert_eq!(config.synergy.max_synergies, defaults.synergy.max_synergies);
        assert_eq!(config.logging.format, defaults.logging.format);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let missing = Config::load(Path::new("/nonexistent/synergy/config.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[history\nbase_url = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SYNERGY_HISTORY_URL", "http://override:8123/api"),
            ("SYNERGY_HISTORY_TOKEN", "tok"),
            ("SYNERGY_ENRICHMENT_URL", "http://enrich"),
            ("SYNERGY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.history.base_url, "http://override:8123/api");
        assert_eq!(config.history.token, "tok");
        assert_eq!(config.context.enrichment_url.as_deref(), Some("http://enrich"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_enrichment_override_disables_source() {
        let mut config = Config::default();
        config.context.enrichment_url = Some("http://enrich".to_string());
        config.apply_overrides(|key| (key == "SYNERGY_ENRICHMENT_URL").then(String::new));

        assert!(config.context.enrichment_url.is_none());
    }
}
