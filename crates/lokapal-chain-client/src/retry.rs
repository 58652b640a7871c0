//! Backoff for transient RPC failures.
//!
//! Connection failures and timeouts are retried. Anything else (a request
//! that could not be built, a redirect loop) fails on the first attempt, and
//! HTTP statuses or JSON-RPC error objects are left to the caller.

use std::future::Future;
use std::time::Duration;

/// Retry schedule: `max_retries` extra attempts, doubling from `base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 retries after 200ms, 400ms and 800ms.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Run `send` until it succeeds, fails permanently, or the policy is spent.
pub(crate) async fn retry_send<F, Fut>(
    policy: &RetryPolicy,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < policy.max_retries && is_transient(&e) => {
                let delay = policy.delay(attempt);
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    "chain RPC unreachable, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
