//! Retry policy with exponential backoff.
//!
//! Retries on network errors, HTTP 429 and HTTP 5xx. Other failures are
//! returned on the first attempt. A `Retry-After` sent with a 429 replaces
//! the computed backoff.

use std::time::{Duration, SystemTime};

use tracing::{info_span, warn, Instrument};

use crate::error::{CreatomateError, CreatomateResult};
use crate::metrics::record_retry;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay cap (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: std::env::var("CREATOMATE_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            ..defaults
        }
    }
}

/// Delay before retry number `attempt + 1`.
///
/// Full jitter over base * 2^attempt (capped at `max_delay_ms`), never below
/// `base_delay_ms`. A server-provided delay is used as is.
fn calculate_delay(config: &RetryConfig, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
    if let Some(after) = retry_after_ms {
        return Duration::from_millis(after);
    }

    let ceiling = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(config.max_delay_ms);

    // Clock-derived factor in [0, 1); no rand dependency for this
    let factor = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() % 1000)
        .unwrap_or(0) as f64
        / 1000.0;
    let jittered = (ceiling as f64 * factor) as u64;

    Duration::from_millis(jittered.max(config.base_delay_ms))
}

/// Execute an async operation with retry.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    op: F,
) -> CreatomateResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = CreatomateResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        let span = info_span!("creatomate_attempt", operation = %operation, attempt = attempt + 1);

        match op().instrument(span).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = calculate_delay(config, attempt, e.retry_after_ms());

                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    server_requested = e.retry_after_ms().is_some(),
                    "Creatomate request failed, retrying: {}",
                    e
                );

                record_retry(operation);

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| CreatomateError::request_failed("Unknown error")))
}
