//! Retry with exponential back-off and jitter for directory lookups.
//!
//! The service defaults to a single attempt (`max_retries = 0`); operators can
//! opt into retries for transient failures through configuration.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx and HTTP 429.
///
/// **Not retriable:** other 4xx responses, missing detail results, malformed
/// bodies and configuration errors. Retrying won't change those.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::Upstream { status, .. } => *status == 429 || (500..600).contains(status),
        PlacesError::MissingResult { .. }
        | PlacesError::Deserialize { .. }
        | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Wait before the `retry`-th retry (1-based): `base_ms * 2^(retry-1)`,
/// capped at 30 s, then scaled by `jitter`.
pub(crate) fn backoff_delay(retry: u32, base_ms: u64, jitter: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let nominal = base_ms.saturating_mul(1u64 << exponent).min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let scaled = (nominal as f64 * jitter) as u64;
    Duration::from_millis(scaled)
}

/// Runs `operation` until it succeeds, fails with a non-retriable error, or
/// `max_retries` retries are spent. Each retry waits [`backoff_delay`] with
/// jitter drawn from `[0.75, 1.25)`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries == max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retries += 1;

        let delay = backoff_delay(retries, backoff_base_ms, rand::random_range(0.75..1.25));
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Places API call failed transiently; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
