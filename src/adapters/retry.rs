use crate::utils::error::NetworkError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;
pub type RetryPredicate = Arc<dyn Fn(&NetworkError) -> bool + Send + Sync>;

/// 重試策略：最大嘗試次數、退避函數、以及判斷錯誤是否值得重試
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffFn,
    retry_if: RetryPredicate,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("first_delay", &self.delay_for(0))
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// 第 i 次失敗後等待 `base * 2^i`
    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Arc::new(move |attempt| {
                base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
            }),
            retry_if: Arc::new(|_| true),
        }
    }

    pub fn single_attempt() -> Self {
        Self::exponential(1, Duration::ZERO)
    }

    pub fn with_backoff<F>(mut self, backoff: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.backoff = Arc::new(backoff);
        self
    }

    pub fn with_retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&NetworkError) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Arc::new(predicate);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        (self.backoff)(attempt_index)
    }

    pub fn should_retry(&self, error: &NetworkError) -> bool {
        (self.retry_if)(error)
    }
}

/// 依策略重試非同步操作；操作收到目前的嘗試序號（從 0 開始）
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, NetworkError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, NetworkError>>,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("✅ Request succeeded on attempt {}", attempt + 1);
                }
                return Ok(value);
            }
            Err(err) => {
                let exhausted = attempt + 1 >= policy.max_attempts();
                if exhausted || !policy.should_retry(&err) {
                    tracing::debug!(
                        "Giving up after attempt {}/{}: {}",
                        attempt + 1,
                        policy.max_attempts(),
                        err
                    );
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "⚠️ Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt + 1,
                    policy.max_attempts(),
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn server_error() -> NetworkError {
        NetworkError::Http {
            status: 503,
            code: None,
            message: "HTTP status 503".to_string(),
            details: None,
        }
    }

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let waits = Arc::new(Mutex::new(Vec::new()));
        let recorded = waits.clone();
        let policy = RetryPolicy::exponential(3, Duration::from_secs(1));
        let base = policy.clone();
        let policy = policy.with_backoff(move |attempt| {
            let delay = base.delay_for(attempt);
            recorded.lock().unwrap().push(delay);
            delay
        });

        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let result = retry_with_backoff(&policy, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok("receipt")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("receipt"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *waits.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_propagates_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&RetryPolicy::default(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(NetworkError::Transport {
                    message: format!("attempt {}", attempt),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result,
            Err(NetworkError::Transport {
                message: "attempt 2".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_predicate_stops_retrying() {
        let policy = RetryPolicy::exponential(3, Duration::from_millis(1))
            .with_retry_if(|err| err.status() != Some(409));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with_backoff(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(NetworkError::Http {
                    status: 409,
                    code: Some("DUPLICATE_VOTE".to_string()),
                    message: "Este DNI ya ha votado".to_string(),
                    details: None,
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
