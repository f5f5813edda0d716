//! Retrying wrapper around any [`LlmPort`].
//!
//! Transient failures are retried with exponential backoff and jitter. The
//! outline generator bounds the whole retried call with its own timeout, so a
//! slow backoff never holds up a generation past that limit.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one. Zero disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of the delay (0.0-1.0) randomly added or removed.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: 0.2,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Un-jittered delay before retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let spread = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        delay.mul_f64((1.0 + spread).max(0.0))
    }
}

pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut retry = 0;
        loop {
            let error = match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if retry > 0 {
                        tracing::info!(retries = retry, "LLM request succeeded after retrying");
                    }
                    return Ok(response);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::error!(error = %error, "LLM request rejected, not retrying");
                return Err(error);
            }
            if retry >= self.config.max_retries {
                tracing::error!(
                    attempts = retry + 1,
                    error = %error,
                    "LLM request failed after all retries"
                );
                return Err(error);
            }

            retry += 1;
            let delay = self.config.jittered(self.config.backoff(retry));
            tracing::warn!(
                retry,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "LLM request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times with `error`, then answers.
    struct FlakyLlm {
        failures: AtomicU32,
        calls: AtomicU32,
        error: LlmError,
    }

    impl FlakyLlm {
        fn new(failures: u32, error: LlmError) -> Arc<Self> {
            Arc::new(Self {
                failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
                error,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmPort for FlakyLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            Ok(LlmResponse::text("{\"sections\": []}"))
        }
    }

    fn no_jitter(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter: 0.0,
        }
    }

    fn request() -> LlmRequest {
        LlmRequest::new(vec![])
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_makes_one_call() {
        let llm = FlakyLlm::new(0, LlmError::RequestFailed("unused".into()));
        let client = ResilientLlmClient::new(llm.clone(), no_jitter(3));

        client.generate(request()).await.unwrap();

        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_and_parse_failures_are_retried() {
        let flaky = FlakyLlm::new(2, LlmError::RequestFailed("connection reset".into()));
        let client = ResilientLlmClient::new(flaky.clone(), no_jitter(3));
        assert!(client.generate(request()).await.is_ok());
        assert_eq!(flaky.calls(), 3);

        let garbled = FlakyLlm::new(1, LlmError::InvalidResponse("eof".into()));
        let client = ResilientLlmClient::new(garbled.clone(), no_jitter(1));
        assert!(client.generate(request()).await.is_ok());
        assert_eq!(garbled.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_retries() {
        let llm = FlakyLlm::new(10, LlmError::RequestFailed("still down".into()));
        let client = ResilientLlmClient::new(llm.clone(), no_jitter(2));

        let err = client.generate(request()).await.unwrap_err();

        assert!(matches!(err, LlmError::RequestFailed(_)));
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_requests_fail_fast() {
        let llm = FlakyLlm::new(
            10,
            LlmError::Rejected {
                status: 404,
                message: "model not found".into(),
            },
        );
        let client = ResilientLlmClient::new(llm.clone(), no_jitter(3));

        let err = client.generate(request()).await.unwrap_err();

        assert!(matches!(err, LlmError::Rejected { status: 404, .. }));
        assert_eq!(llm.calls(), 1);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = RetryConfig {
            max_retries: 6,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: 0.0,
        };

        let delays: Vec<u64> = (1..=6).map(|r| config.backoff(r).as_secs()).collect();

        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30]);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let config = RetryConfig {
            jitter: 0.5,
            ..RetryConfig::default()
        };
        let base = Duration::from_millis(1000);

        for _ in 0..50 {
            let delay = config.jittered(base);
            assert!(delay >= Duration::from_millis(500) && delay <= Duration::from_millis(1500));
        }
    }
}
