//! API-key format checks run before any backend is constructed, so an
//! obviously broken credential fails at startup instead of on the first
//! review.

use crate::config::Config;

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 512;

const PLACEHOLDERS: &[&str] = &[
    "your-api-key",
    "your_api_key",
    "api-key-here",
    "placeholder",
    "xxx",
    "test",
    "example",
];

#[derive(Debug, thiserror::Error)]
#[error("invalid credential for {backend}: {reason}")]
pub struct CredentialError {
    pub backend: &'static str,
    pub reason: String,
}

fn basic_checks(backend: &'static str, key: &str) -> Result<(), CredentialError> {
    let fail = |reason: String| Err(CredentialError { backend, reason });

    if key.is_empty() {
        return fail("key is empty".to_string());
    }
    if key.len() < MIN_LENGTH {
        return fail(format!("key too short (minimum {} characters)", MIN_LENGTH));
    }
    if key.len() > MAX_LENGTH {
        return fail(format!("key too long (maximum {} characters)", MAX_LENGTH));
    }

    let lower = key.to_lowercase();
    if PLACEHOLDERS.iter().any(|p| lower.contains(p)) {
        return fail("key appears to be a placeholder value".to_string());
    }

    Ok(())
}

pub fn validate_anthropic_key(key: &str) -> Result<(), CredentialError> {
    basic_checks("anthropic", key)?;
    if !key.starts_with("sk-ant-") {
        return Err(CredentialError {
            backend: "anthropic",
            reason: "key should start with 'sk-ant-'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_openai_key(key: &str) -> Result<(), CredentialError> {
    basic_checks("openai", key)?;
    if !key.starts_with("sk-") {
        return Err(CredentialError {
            backend: "openai",
            reason: "key should start with 'sk-'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_google_key(key: &str) -> Result<(), CredentialError> {
    basic_checks("google", key)?;
    // Google keys carry no stable prefix.
    if key.contains(' ') {
        return Err(CredentialError {
            backend: "google",
            reason: "key should not contain spaces".to_string(),
        });
    }
    Ok(())
}

/// Check every configured key; unconfigured backends are skipped.
pub fn validate_all(cfg: &Config) -> Vec<CredentialError> {
    let mut errors = Vec::new();
    if let Some(key) = &cfg.anthropic_api_key {
        if let Err(e) = validate_anthropic_key(key) {
            errors.push(e);
        }
    }
    if let Some(key) = &cfg.openai_api_key {
        if let Err(e) = validate_openai_key(key) {
            errors.push(e);
        }
    }
    if let Some(key) = &cfg.google_api_key {
        if let Err(e) = validate_google_key(key) {
            errors.push(e);
        }
    }
    errors
}

/// Mask a key for logging, keeping the first and last two characters.
/// Counts characters, not bytes, so multibyte keys never split mid-char.
pub fn mask(key: &str) -> String {
    if key.is_empty() {
        return "<empty>".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}...{}", head, tail)
}
