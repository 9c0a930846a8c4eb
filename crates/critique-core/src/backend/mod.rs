pub mod anthropic;
pub mod google;
pub mod openai;
mod prompt;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::config::Config;
use crate::credentials;
use crate::request::Request;
use crate::response::Response;

pub use anthropic::AnthropicBackend;
pub use google::GoogleBackend;
pub use openai::OpenAiBackend;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("credential rejected: {0}")]
    Auth(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("API call timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to parse API response: {0}")]
    Parse(String),
}

/// One reviewing LLM. Implementations build a prompt from the request,
/// call their API, and map the reply into a `Response`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn review(&self, req: &Request) -> Result<Response, BackendError>;

    fn name(&self) -> &str;

    fn is_available(&self) -> bool;
}

pub type Registry = HashMap<String, Arc<dyn Backend>>;

/// Build the name→backend registry from configured API keys. Built once
/// at startup; the engine only ever reads it.
pub fn registry_from_config(cfg: &Config) -> Registry {
    let mut backends: Registry = HashMap::new();

    if let Some(key) = &cfg.anthropic_api_key {
        match AnthropicBackend::new(key.clone(), cfg.anthropic_timeout) {
            Ok(backend) => {
                info!(key = %credentials::mask(key), "anthropic backend initialized");
                backends.insert("anthropic".to_string(), Arc::new(backend));
            }
            Err(e) => error!(error = %e, "failed to initialize anthropic backend"),
        }
    }

    if let Some(key) = &cfg.openai_api_key {
        match OpenAiBackend::new(key.clone(), cfg.openai_timeout) {
            Ok(backend) => {
                info!(key = %credentials::mask(key), "openai backend initialized");
                backends.insert("openai".to_string(), Arc::new(backend));
            }
            Err(e) => error!(error = %e, "failed to initialize openai backend"),
        }
    }

    if let Some(key) = &cfg.google_api_key {
        match GoogleBackend::new(key.clone(), cfg.google_timeout) {
            Ok(backend) => {
                info!(key = %credentials::mask(key), "google backend initialized");
                backends.insert("google".to_string(), Arc::new(backend));
            }
            Err(e) => error!(error = %e, "failed to initialize google backend"),
        }
    }

    backends
}

/// Shared reqwest client construction; the timeout bounds each API
/// call independently of the engine's retry policy.
fn http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Api(format!("failed to build HTTP client: {}", e)))
}

fn classify_transport_error(e: reqwest::Error, timeout: Duration) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(timeout)
    } else {
        BackendError::Api(format!("request failed: {}", e))
    }
}

async fn read_api_failure(resp: reqwest::Response) -> BackendError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        BackendError::Auth(format!("{}: {}", status, body))
    } else {
        BackendError::Api(format!("{}: {}", status, body))
    }
}
