//! Quota-aware gate in front of hosting service calls

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::error::ProviderError;
use super::types::RateLimitStatus;
use super::SourceProvider;

/// Default spacing between calls for providers without a quota API
pub const DEFAULT_FALLBACK_WINDOW_SECS: u64 = 1;

// Added to the reset wait to absorb clock skew between us and the provider
const CLOCK_SKEW_MARGIN_SECS: i64 = 1;

/// How long to wait before the next call, if at all
///
/// Only an exhausted quota waits: `reset_at - now + 1` seconds. A reset time
/// already in the past yields no wait.
pub fn quota_wait(status: &RateLimitStatus, now: DateTime<Utc>) -> Option<Duration> {
    if status.remaining > 0 {
        return None;
    }
    let secs = (status.reset_at - now).num_seconds() + CLOCK_SKEW_MARGIN_SECS;
    u64::try_from(secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Suspends the caller until the provider will accept another call
///
/// Providers that report quota are asked before every call. Providers that
/// don't get a fixed minimum spacing between calls instead. The last-call
/// timestamp sits behind a mutex so concurrent callers stay serialized.
#[derive(Debug)]
pub struct RateLimiter {
    fallback_window: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_FALLBACK_WINDOW_SECS))
    }
}

impl RateLimiter {
    pub fn new(fallback_window: Duration) -> Self {
        Self {
            fallback_window,
            last_call: Mutex::new(None),
        }
    }

    /// Waits until a call is allowed. Errors only when the quota query itself fails.
    pub async fn acquire(&self, provider: &dyn SourceProvider) -> Result<(), ProviderError> {
        match provider.rate_limit_status().await? {
            Some(status) => {
                if let Some(wait) = quota_wait(&status, Utc::now()) {
                    tracing::info!(
                        platform = %provider.platform(),
                        reset_at = %status.reset_at,
                        wait_secs = wait.as_secs(),
                        "rate limit exhausted, waiting for reset"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
            None => {
                let mut last_call = self.last_call.lock().await;
                if let Some(previous) = *last_call {
                    let elapsed = previous.elapsed();
                    if elapsed < self.fallback_window {
                        tokio::time::sleep(self.fallback_window - elapsed).await;
                    }
                }
                *last_call = Some(Instant::now());
            }
        }
        Ok(())
    }
}
