use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{classify_transport_error, http_client, prompt, read_api_failure, Backend, BackendError};
use crate::request::Request;
use crate::response::Response;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicBackend {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    async fn review(&self, req: &Request) -> Result<Response, BackendError> {
        let start = Instant::now();

        let request = ApiRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt::build_review_prompt(req),
            }],
        };

        let resp = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        if !resp.status().is_success() {
            return Err(read_api_failure(resp).await);
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let text: String = api_resp
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect();

        let (findings, summary) = prompt::parse_review_response(&text);

        Ok(Response {
            findings,
            summary,
            backend: self.name().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            metadata: Some(prompt::build_metadata(req, MODEL)),
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_available(&self) -> bool {
        true
    }
}
