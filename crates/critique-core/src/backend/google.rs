use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{classify_transport_error, http_client, prompt, read_api_failure, Backend, BackendError};
use crate::request::Request;
use crate::response::Response;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-1.5-flash";

pub struct GoogleBackend {
    client: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GoogleBackend {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl Backend for GoogleBackend {
    async fn review(&self, req: &Request) -> Result<Response, BackendError> {
        let start = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE, MODEL, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt::build_review_prompt(req),
                }],
            }],
        };

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        if !resp.status().is_success() {
            return Err(read_api_failure(resp).await);
        }

        let api_resp: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let text: String = api_resp
            .candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| &content.parts)
            .filter_map(|part| part.text.as_deref())
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
        "google"
    }

    fn is_available(&self) -> bool {
        true
    }
}
