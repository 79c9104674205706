//! Resilient calls
//!
//! Wraps an async lookup with a per-attempt timeout, bounded retries with
//! exponential backoff, and cancellation. Exhausted or cancelled calls
//! degrade to `None`.

use super::sources::EnrichmentError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timeout and retry settings for one lookup
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Limit for a single attempt
    pub timeout: Duration,
    /// Attempts after the first one
    pub max_retries: u32,
    /// Backoff before retry `n` is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Upper bound on time spent in one call, excluding cancellation
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_retries + 1;
        let sleeps: Duration = (0..self.max_retries).map(|a| self.backoff(a)).sum();
        self.timeout.saturating_mul(attempts) + sleeps
    }
}

/// Run `op` under `policy`, returning its value or `None`
///
/// A successful `Ok(None)` is final and not retried: the source answered
/// that it has no data.
pub async fn fetch_with_retry<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, EnrichmentError>>,
{
    for attempt in 0..=policy.max_retries {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(EnrichmentError::Cancelled),
            result = tokio::time::timeout(policy.timeout, op()) => {
                result.unwrap_or(Err(EnrichmentError::Timeout))
            }
        };

        match outcome {
            Ok(value) => return value,
            Err(EnrichmentError::Cancelled) => {
                tracing::debug!(source = label, "Enrichment cancelled");
                return None;
            }
            Err(e) => {
                tracing::warn!(source = label, attempt, error = %e, "Enrichment attempt failed");
            }
        }

        if attempt < policy.max_retries {
            let delay = policy.backoff(attempt);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(source = label, "Enrichment cancelled during backoff");
                    return None;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    tracing::warn!(
        source = label,
        attempts = policy.max_retries + 1,
        "Enrichment unavailable, continuing without it"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(20),
            max_retries: 2,
            base_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.worst_case(), Duration::from_secs(15 + 3));
    }

    #[tokio::test]
    async fn test_returns_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let value = fetch_with_retry("test", &fast_policy(), &CancellationToken::new(), || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(EnrichmentError::Failed("flaky".to_string()))
                } else {
                    Ok(Some(42))
                }
            }
        })
        .await;

        assert_eq!(value, Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_null_answer_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let value: Option<u32> =
            fetch_with_retry("test", &fast_policy(), &CancellationToken::new(), || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            })
            .await;

        assert_eq!(value, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hanging_source_times_out_within_bound() {
        let policy = fast_policy();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let started = Instant::now();

        let value: Option<u32> = fetch_with_retry("test", &policy, &CancellationToken::new(), || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Some(1))
            }
        })
        .await;

        assert_eq!(value, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() < policy.worst_case() + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_retries() {
        let policy = RetryPolicy {
            timeout: Duration::from_secs(5),
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let value: Option<u32> = fetch_with_retry("test", &policy, &cancel, || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some(1))
        })
        .await;

        assert_eq!(value, None);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
