use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::backend::{BackendError, Registry};
use crate::git::GitError;
use crate::request::{Request, ValidationError};
use crate::resolve::resolve_source;
use crate::response::Response;

const DEFAULT_MAX_RETRIES: u32 = 1;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to get git diff: {0}")]
    SourceFetch(#[from] GitError),
    #[error("diff size ({actual} bytes) exceeds maximum allowed size ({limit} bytes); review smaller changes or raise CRITIQUE_MAX_DIFF_SIZE")]
    DiffTooLarge { actual: usize, limit: usize },
    #[error("backend {0} not found")]
    BackendNotFound(String),
    #[error("backend {0} not available")]
    BackendUnavailable(String),
    #[error("review failed after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: BackendError },
    #[error("review cancelled")]
    Cancelled,
}

/// Orchestrates one review: validate, resolve the payload, guard its
/// size, pick a backend, invoke it with bounded retry, and hand back
/// the response. Holds no per-request state, so one engine serves
/// concurrent callers.
pub struct Engine {
    backends: Registry,
    default_backend: String,
    max_diff_size: usize,
    max_retries: u32,
    retry_delay: Duration,
}

impl Engine {
    pub fn new(
        backends: Registry,
        default_backend: impl Into<String>,
        max_diff_size: usize,
    ) -> Self {
        Self {
            backends,
            default_backend: default_backend.into(),
            max_diff_size,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the retry policy. `max_retries` counts extra attempts
    /// beyond the first; the delay before retry k is `retry_delay * k`.
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Names of the registered backends that report themselves ready.
    pub fn available_backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .backends
            .iter()
            .filter(|(_, backend)| backend.is_available())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub async fn review(
        &self,
        mut req: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, EngineError> {
        let start = Instant::now();

        if let Err(e) = req.validate(&self.default_backend) {
            error!(error = %e, "invalid review request");
            return Err(e.into());
        }

        if let Err(e) = resolve_source(&mut req).await {
            error!(error = %e, "failed to fetch review source");
            return Err(e.into());
        }

        if req.code.len() > self.max_diff_size {
            error!(
                size_bytes = req.code.len(),
                max_size_bytes = self.max_diff_size,
                "diff too large"
            );
            return Err(EngineError::DiffTooLarge {
                actual: req.code.len(),
                limit: self.max_diff_size,
            });
        }

        let name = req.backend_or(&self.default_backend).to_string();
        let Some(backend) = self.backends.get(&name) else {
            error!(backend = %name, "backend not found");
            return Err(EngineError::BackendNotFound(name));
        };
        if !backend.is_available() {
            error!(backend = %name, "backend not available");
            return Err(EngineError::BackendUnavailable(name));
        }

        info!(
            backend = %name,
            source = %req.source,
            depth = %req.depth,
            code_size_bytes = req.code.len(),
            "starting code review"
        );

        let max_attempts = self.max_retries + 1;
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let delay = self.retry_delay * attempt;
                info!(
                    backend = %name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying review"
                );
                // The backoff wait races cancellation, never outlives it.
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        warn!(backend = %name, "review cancelled during backoff");
                        return Err(EngineError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            info!(
                backend = %name,
                attempt = attempt + 1,
                max_attempts,
                "sending review request"
            );

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(backend = %name, "review cancelled");
                    return Err(EngineError::Cancelled);
                }
                result = backend.review(&req) => result,
            };

            match result {
                Ok(mut resp) => {
                    resp.duration_ms = start.elapsed().as_millis() as u64;
                    info!(
                        backend = %name,
                        findings_count = resp.findings.len(),
                        duration_ms = resp.duration_ms,
                        "review completed"
                    );
                    return Ok(resp);
                }
                Err(e) => {
                    warn!(
                        backend = %name,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "review attempt failed"
                    );
                    if attempt >= self.max_retries {
                        error!(
                            backend = %name,
                            attempts = max_attempts,
                            error = %e,
                            "review failed after retries"
                        );
                        return Err(EngineError::Exhausted {
                            attempts: max_attempts,
                            source: e,
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::backend::Backend;

    struct MockBackend {
        available: bool,
        /// Fail this many leading calls before succeeding.
        fail_first: u32,
        /// Cancel this token from inside each call, when set.
        cancel_on_call: Option<CancellationToken>,
        calls: AtomicU32,
    }

    impl MockBackend {
        fn ready() -> Self {
            Self {
                available: true,
                fail_first: 0,
                cancel_on_call: None,
                calls: AtomicU32::new(0),
            }
        }

        fn failing_first(n: u32) -> Self {
            Self {
                fail_first: n,
                ..Self::ready()
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn review(&self, _req: &Request) -> Result<Response, BackendError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            if call <= self.fail_first {
                return Err(BackendError::Api("mock failure".to_string()));
            }
            Ok(Response {
                findings: Vec::new(),
                summary: "looks fine".to_string(),
                backend: "mock".to_string(),
                duration_ms: 0,
                metadata: None,
            })
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn is_available(&self) -> bool {
            self.available
        }
    }

    fn engine_with(mock: Arc<MockBackend>) -> Engine {
        let mut backends: Registry = HashMap::new();
        backends.insert("mock".to_string(), mock as Arc<dyn Backend>);
        Engine::new(backends, "mock", 10_000)
    }

    #[tokio::test]
    async fn successful_review_calls_backend_once() {
        let mock = Arc::new(MockBackend::ready());
        let engine = engine_with(mock.clone());

        let resp = engine
            .review(Request::arbitrary("fn main() {}", "rust"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resp.backend, "mock");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn validation_failure_invokes_no_backend() {
        let mock = Arc::new(MockBackend::ready());
        let engine = engine_with(mock.clone());

        let err = engine
            .review(Request::arbitrary("", "rust"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_backend_is_not_found() {
        let engine = engine_with(Arc::new(MockBackend::ready()));

        let mut req = Request::arbitrary("code", "rust");
        req.backend = Some("nonexistent".to_string());
        let err = engine.review(req, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, EngineError::BackendNotFound(_)));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[tokio::test]
    async fn unavailable_backend_is_rejected() {
        let mock = Arc::new(MockBackend {
            available: false,
            ..MockBackend::ready()
        });
        let engine = engine_with(mock.clone());

        let err = engine
            .review(Request::arbitrary("code", "rust"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::BackendUnavailable(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_and_names_the_count() {
        let mock = Arc::new(MockBackend::failing_first(u32::MAX));
        let engine = engine_with(mock.clone());

        let err = engine
            .review(Request::arbitrary("code", "rust"), &CancellationToken::new())
            .await
            .unwrap_err();

        // One initial attempt plus one retry under the default policy.
        assert_eq!(mock.call_count(), 2);
        assert!(matches!(err, EngineError::Exhausted { attempts: 2, .. }));
        assert!(err.to_string().contains("after 2 attempts"));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failure() {
        let mock = Arc::new(MockBackend::failing_first(2));
        let engine = engine_with(mock.clone()).with_retry_policy(3, Duration::from_secs(1));

        let resp = engine
            .review(Request::arbitrary("code", "rust"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resp.summary, "looks fine");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let mock = Arc::new(MockBackend::ready());
        let mut backends: Registry = HashMap::new();
        backends.insert("mock".to_string(), mock.clone() as Arc<dyn Backend>);
        let engine = Engine::new(backends, "mock", 8);

        let err = engine
            .review(
                Request::arbitrary("a much longer payload", "rust"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::DiffTooLarge { actual: 21, limit: 8 }));
        assert!(err.to_string().contains("21 bytes"));
        assert!(err.to_string().contains("8 bytes"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn prepopulated_staged_code_skips_git() {
        let mock = Arc::new(MockBackend::ready());
        let engine = engine_with(mock.clone());

        // The repository path does not exist; if resolution touched
        // git this would fail instead of reviewing.
        let mut req = Request::staged("/definitely/not/a/repo");
        req.code = "diff --git a/x b/x\n@@ -1 +1 @@\n-a\n+b\n".to_string();

        let resp = engine.review(req, &CancellationToken::new()).await.unwrap();
        assert_eq!(resp.backend, "mock");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_token_invokes_nothing() {
        let mock = Arc::new(MockBackend::ready());
        let engine = engine_with(mock.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine
            .review(Request::arbitrary("code", "rust"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Cancelled));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_backoff() {
        let cancel = CancellationToken::new();
        let mock = Arc::new(MockBackend {
            fail_first: u32::MAX,
            cancel_on_call: Some(cancel.clone()),
            ..MockBackend::ready()
        });
        let engine = engine_with(mock.clone()).with_retry_policy(5, Duration::from_secs(60));

        // The first attempt cancels the token and fails; the loop must
        // observe cancellation in the backoff wait, not sleep it out.
        let err = engine
            .review(Request::arbitrary("code", "rust"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Cancelled));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn default_backend_substitutes_when_unset() {
        let mock = Arc::new(MockBackend::ready());
        let engine = engine_with(mock.clone());

        let req = Request::arbitrary("code", "rust");
        assert!(req.backend.is_none());

        let resp = engine.review(req, &CancellationToken::new()).await.unwrap();
        assert_eq!(resp.backend, "mock");
    }

    #[tokio::test]
    async fn lists_available_backends() {
        let engine = engine_with(Arc::new(MockBackend::ready()));
        assert_eq!(engine.available_backends(), vec!["mock"]);

        let down = Arc::new(MockBackend {
            available: false,
            ..MockBackend::ready()
        });
        let engine = engine_with(down);
        assert!(engine.available_backends().is_empty());
    }
}
