// Bounded retry for store contention
// Only StoreBusy is retried; every other outcome is returned as-is

use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use super::errors::OrderError;
use crate::config::RetryConfig;

#[derive(Debug, Clone)]
pub struct StoreRetryHandler {
    config: RetryConfig,
}

impl StoreRetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Never retry; used where the caller handles contention itself
    pub fn disabled() -> Self {
        Self::new(RetryConfig {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        })
    }

    fn delays(&self) -> impl Iterator<Item = Duration> {
        // from_millis(2) doubles each step; the factor scales the first step to base_delay
        ExponentialBackoff::from_millis(2)
            .factor((self.config.base_delay_ms / 2).max(1))
            .max_delay(Duration::from_millis(self.config.max_delay_ms.max(1)))
            .map(jitter)
            .take(self.config.max_retries as usize)
    }

    /// Run `operation`, repeating it while it fails with `StoreBusy`
    pub async fn execute_with_retry<F, Fut, T>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, OrderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OrderError>>,
    {
        debug!(
            operation = operation_name,
            max_retries = self.config.max_retries,
            "Starting store operation"
        );

        RetryIf::spawn(self.delays(), operation, |error: &OrderError| {
            let retry = error.is_retryable();
            if retry {
                warn!(operation = operation_name, error = %error, "Store busy, retrying");
            }
            retry
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 2,
            max_delay_ms: 10,
        }
    }

    #[tokio::test]
    async fn test_retry_success_after_busy() {
        let retry_handler = StoreRetryHandler::new(quick_config(3));
        let attempt_count = Arc::new(AtomicU32::new(0));

        let result = retry_handler
            .execute_with_retry("test", || {
                let attempt_count = attempt_count.clone();
                async move {
                    let count = attempt_count.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(OrderError::StoreBusy("database is locked".to_string()))
                    } else {
                        Ok("success")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_busy_surfaces_after_bounded_attempts() {
        let retry_handler = StoreRetryHandler::new(quick_config(2));
        let attempt_count = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = retry_handler
            .execute_with_retry("test", || {
                let attempt_count = attempt_count.clone();
                async move {
                    attempt_count.fetch_add(1, Ordering::SeqCst);
                    Err(OrderError::StoreBusy("database is locked".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(OrderError::StoreBusy(_))));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error() {
        let retry_handler = StoreRetryHandler::new(quick_config(3));
        let attempt_count = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = retry_handler
            .execute_with_retry("test", || {
                let attempt_count = attempt_count.clone();
                async move {
                    attempt_count.fetch_add(1, Ordering::SeqCst);
                    Err(OrderError::NotFound("77".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound(_))));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_handler_tries_once() {
        let retry_handler = StoreRetryHandler::disabled();
        let attempt_count = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = retry_handler
            .execute_with_retry("test", || {
                let attempt_count = attempt_count.clone();
                async move {
                    attempt_count.fetch_add(1, Ordering::SeqCst);
                    Err(OrderError::StoreBusy("locked".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }
}
