//! Retry with exponential backoff for query fetchers.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::error::FetchError;
use super::key::QueryKey;

/// How often and how patiently a failed fetch is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Retries after the first attempt
  pub retries: u32,
  pub base_delay: Duration,
  pub max_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      retries: 3,
      base_delay: Duration::from_millis(1000),
      max_delay: Duration::from_millis(30_000),
    }
  }
}

impl RetryPolicy {
  /// Fail on the first error.
  pub fn none() -> Self {
    Self {
      retries: 0,
      ..Self::default()
    }
  }

  /// Delay before retry number `attempt` (0-based): `min(base * 2^attempt, max)`.
  pub fn delay(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    self
      .base_delay
      .checked_mul(factor)
      .unwrap_or(self.max_delay)
      .min(self.max_delay)
  }

  /// Run `fetcher` until it succeeds or retries run out.
  pub async fn run<T, F, Fut>(&self, key: &QueryKey, fetcher: &F) -> Result<T, FetchError>
  where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
  {
    let mut attempt = 0;
    loop {
      match fetcher().await {
        Ok(data) => return Ok(data),
        Err(err) if attempt < self.retries => {
          let delay = self.delay(attempt);
          warn!(%key, attempt = attempt + 1, ?delay, error = %err, "Fetch failed, retrying");
          tokio::time::sleep(delay).await;
          attempt += 1;
        }
        Err(err) => return Err(err),
      }
    }
  }
}
