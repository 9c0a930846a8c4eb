use std::time::Duration;

/// Error message names the variables so a misconfigured install is
/// fixable from the log alone.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one backend API key must be configured (ANTHROPIC_API_KEY, OPENAI_API_KEY, or GOOGLE_API_KEY)")]
    NoBackends,
}

/// Process configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub default_backend: String,
    /// Ceiling on review payload size, in bytes.
    pub max_diff_size: usize,
    pub anthropic_timeout: Duration,
    pub openai_timeout: Duration,
    pub google_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = Self {
            anthropic_api_key: non_empty_env("ANTHROPIC_API_KEY"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            google_api_key: non_empty_env("GOOGLE_API_KEY"),
            default_backend: env_or("CRITIQUE_DEFAULT_BACKEND", "anthropic"),
            max_diff_size: parsed_env("CRITIQUE_MAX_DIFF_SIZE", 10_000),
            anthropic_timeout: Duration::from_secs(parsed_env("ANTHROPIC_TIMEOUT_SECS", 90)),
            openai_timeout: Duration::from_secs(parsed_env("OPENAI_TIMEOUT_SECS", 90)),
            google_timeout: Duration::from_secs(parsed_env("GOOGLE_TIMEOUT_SECS", 90)),
        };

        if cfg.anthropic_api_key.is_none()
            && cfg.openai_api_key.is_none()
            && cfg.google_api_key.is_none()
        {
            return Err(ConfigError::NoBackends);
        }

        Ok(cfg)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    non_empty_env(key).unwrap_or_else(|| default.to_string())
}

/// Unset or malformed values fall back to the default.
fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
