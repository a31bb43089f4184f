use anyhow::{Result, anyhow};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with linear backoff and a per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: usize,
    /// Delay after the n-th failed attempt is `n * backoff_step`.
    pub backoff_step: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, failed_attempt: usize) -> Duration {
        self.backoff_step * failed_attempt as u32
    }

    /// Runs `operation` until it succeeds or attempts run out.
    ///
    /// Returns `None` once every attempt failed or timed out; the failures are logged,
    /// not returned.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for attempt in 1..=self.max_attempts {
            let outcome = tokio::time::timeout(self.timeout, operation())
                .await
                .unwrap_or_else(|_| Err(anyhow!("timed out after {:?}", self.timeout)));
            match outcome {
                Ok(value) => return Some(value),
                Err(err) if attempt < self.max_attempts => {
                    debug!(
                        "Attempt {}/{} for {} failed: {}. Retrying...",
                        attempt, self.max_attempts, label, err
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Err(err) => {
                    warn!(
                        "Giving up on {} after {} attempts: {}",
                        label, self.max_attempts, err
                    );
                }
            }
        }
        None
    }
}

/// Sends a GET request and returns its body, treating non-2xx and empty bodies as errors.
pub async fn fetch_body(request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP error: {}", status));
    }
    let body = response.bytes().await?;
    if body.is_empty() {
        return Err(anyhow!("Received empty response"));
    }
    Ok(body.to_vec())
}
