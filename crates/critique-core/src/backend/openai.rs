use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{classify_transport_error, http_client, prompt, read_api_failure, Backend, BackendError};
use crate::request::Request;
use crate::response::Response;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o";

const SYSTEM_PROMPT: &str =
    "You are a code review assistant. Respond only with the requested JSON.";

pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl OpenAiBackend {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn review(&self, req: &Request) -> Result<Response, BackendError> {
        let start = Instant::now();

        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt::build_review_prompt(req),
                },
            ],
        };

        let resp = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        if !resp.status().is_success() {
            return Err(read_api_failure(resp).await);
        }

        let api_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let text = api_resp
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or("");

        let (findings, summary) = prompt::parse_review_response(text);

        Ok(Response {
            findings,
            summary,
            backend: self.name().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            metadata: Some(prompt::build_metadata(req, MODEL)),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn is_available(&self) -> bool {
        true
    }
}
