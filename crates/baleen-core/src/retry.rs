//! Bounded retry with exponential backoff for API calls.
//!
//! A [`RetryPolicy`] decides which API errors are worth another attempt and
//! how long to wait between attempts. The two standard policies cover the
//! poll loop's `getUpdates` call and handler invocations; the delays are
//! configurable at runtime construction.

use std::time::Duration;

use tracing::warn;

use baleen_client::{ClientError, ClientResult};

/// Codes that are never retried, whatever the policy allows.
const AUTH_CODES: [i64; 2] = [401, 403];

/// Codes that widen the backoff to the server-suggested pause.
const RATE_LIMIT_CODES: [i64; 2] = [420, 429];

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Retry rules for one class of API call.
///
/// An error is retried only when it carries a code listed in
/// `allowed_codes`; errors without a code (network failures, decode
/// failures, local validation) and the auth codes 401/403 always propagate
/// immediately. `max_retries = None` retries forever, which the fetch path
/// relies on for the API's "no new updates yet" 404.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry budget; `None` means unbounded.
    pub max_retries: Option<u32>,
    /// API error codes worth another attempt.
    pub allowed_codes: Vec<i64>,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay per further retry.
    pub backoff_factor: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the default delay curve (1 s doubling up to
    /// 60 s).
    pub fn new(max_retries: Option<u32>, allowed_codes: impl IntoIterator<Item = i64>) -> Self {
        Self {
            max_retries,
            allowed_codes: allowed_codes.into_iter().collect(),
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// The standard policy for `getUpdates` fetches.
    pub fn fetch() -> Self {
        Self::new(Some(5), [420, 404, 500])
    }

    /// The standard policy for handler invocations.
    pub fn handler() -> Self {
        Self::new(Some(5), [420, 404])
    }

    /// Overrides the delay curve.
    pub fn with_delays(
        mut self,
        initial_delay: Duration,
        backoff_factor: f64,
        max_delay: Duration,
    ) -> Self {
        self.initial_delay = initial_delay;
        self.backoff_factor = backoff_factor;
        self.max_delay = max_delay;
        self
    }

    fn is_retryable(&self, error: &ClientError) -> bool {
        match error.code() {
            Some(code) => !AUTH_CODES.contains(&code) && self.allowed_codes.contains(&code),
            None => false,
        }
    }

    fn delay_for(&self, retries: u32, error: &ClientError) -> Duration {
        let exponent = retries.saturating_sub(1);
        let backoff = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent as i32);
        let mut delay = Duration::from_secs_f64(backoff.min(self.max_delay.as_secs_f64()));
        if let (Some(code), Some(retry_after)) = (error.code(), error.retry_after())
            && RATE_LIMIT_CODES.contains(&code)
        {
            delay = std::cmp::max(delay, Duration::from_secs(retry_after));
        }
        delay
    }

    /// Runs `op`, retrying per this policy.
    ///
    /// `op` is called once per attempt and must build a fresh future each
    /// time. When the budget is exhausted the last error propagates.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut retries = 0u32;
        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if !self.is_retryable(&error) {
                return Err(error);
            }
            retries += 1;
            if let Some(max) = self.max_retries
                && retries > max
            {
                return Err(error);
            }
            let delay = self.delay_for(retries, &error);
            warn!(code = ?error.code(), retries, delay = ?delay, "Retrying after API error");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::time::Instant;

    use super::*;

    fn api_error(code: i64) -> ClientError {
        ClientError::Api {
            code: Some(code),
            description: format!("error {code}"),
            retry_after: None,
        }
    }

    /// Fails `failures` times with `code`, then succeeds, recording the
    /// virtual time of every attempt.
    fn flaky_op(
        failures: usize,
        code: i64,
        attempts: &Arc<Mutex<Vec<Instant>>>,
    ) -> impl FnMut() -> std::future::Ready<ClientResult<u32>> {
        let attempts = Arc::clone(attempts);
        let counter = AtomicUsize::new(0);
        move || {
            attempts.lock().push(Instant::now());
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if attempt < failures {
                Err(api_error(code))
            } else {
                Ok(7)
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_double_from_initial() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let policy = RetryPolicy::new(Some(5), [500]);

        let result = policy.run(flaky_op(3, 500, &attempts)).await;
        assert_eq!(result.unwrap(), 7);

        let attempts = attempts.lock();
        assert_eq!(attempts.len(), 4);
        let gaps: Vec<f64> = attempts
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_secs_f64())
            .collect();
        assert_eq!(gaps, vec![1.0, 2.0, 4.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_capped() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let policy = RetryPolicy::new(Some(5), [500]).with_delays(
            Duration::from_secs(30),
            2.0,
            Duration::from_secs(60),
        );

        policy.run(flaky_op(3, 500, &attempts)).await.unwrap();

        let attempts = attempts.lock();
        let gaps: Vec<f64> = attempts
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_secs_f64())
            .collect();
        // 30, 60, then capped at 60 instead of 120.
        assert_eq!(gaps, vec![30.0, 60.0, 60.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_widens_delay_to_retry_after() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let attempts_clone = Arc::clone(&attempts);
        let counter = AtomicUsize::new(0);
        let policy = RetryPolicy::handler();

        let result = policy
            .run(move || {
                attempts_clone.lock().push(Instant::now());
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(if attempt == 0 {
                    Err(ClientError::Api {
                        code: Some(420),
                        description: "flood".to_string(),
                        retry_after: Some(9),
                    })
                } else {
                    Ok(())
                })
            })
            .await;
        assert!(result.is_ok());

        let attempts = attempts.lock();
        assert_eq!((attempts[1] - attempts[0]).as_secs_f64(), 9.0);
    }

    #[tokio::test]
    async fn test_auth_errors_never_retry() {
        // Even listed codes must propagate when they are auth failures.
        let policy = RetryPolicy::new(Some(5), [401, 403, 500]);
        let calls = AtomicUsize::new(0);

        let result: ClientResult<()> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err(api_error(401)))
            })
            .await;
        assert_eq!(result.unwrap_err().code(), Some(401));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unlisted_and_codeless_errors_propagate() {
        let policy = RetryPolicy::handler();

        let result: ClientResult<()> = policy
            .run(|| std::future::ready(Err(api_error(500))))
            .await;
        assert_eq!(result.unwrap_err().code(), Some(500));

        let result: ClientResult<()> = policy
            .run(|| std::future::ready(Err(ClientError::invalid_input("bad"))))
            .await;
        assert!(result.unwrap_err().code().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finite_budget_propagates_last_error() {
        let policy = RetryPolicy::new(Some(2), [404]);
        let calls = AtomicUsize::new(0);

        let result: ClientResult<()> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err(api_error(404)))
            })
            .await;
        assert_eq!(result.unwrap_err().code(), Some(404));
        // One initial attempt plus two retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_policy_keeps_retrying() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let policy = RetryPolicy::new(None, [404]);

        let result = policy.run(flaky_op(10, 404, &attempts)).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.lock().len(), 11);
    }
}
