//! Bounded retry with capped exponential backoff.
//!
//! A [`RetryPolicy`] wraps one unit of work. On each failure it logs, sleeps
//! `min(delay, max_delay)` if attempts remain, multiplies the delay by the
//! backoff factor, and tries again. The final failure is returned unchanged.
//!
//! The same policy drives async work ([`RetryPolicy::run`]) and blocking work
//! ([`RetryPolicy::run_blocking`]); each call owns its own timer.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetrySettings;

/// Retry parameters for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves as one.
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,
    /// Ceiling for any single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        backoff_factor: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff_factor,
            max_delay,
        }
    }

    /// Policy for loading and encoding images: 3 attempts, 4s doubling, 10s cap.
    pub fn encode() -> Self {
        Self::new(3, Duration::from_secs(4), 2.0, Duration::from_secs(10))
    }

    /// Policy for the summarization call: 3 attempts, 2s doubling, 10s cap.
    pub fn summarize() -> Self {
        Self::new(3, Duration::from_secs(2), 2.0, Duration::from_secs(10))
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, 1.0, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// The sleeps taken between attempts if every attempt fails.
    pub fn delays(&self) -> Vec<Duration> {
        let mut backoff = Backoff::new(self);
        (1..self.attempts()).map(|_| backoff.next_delay()).collect()
    }

    /// Run an async operation under this policy.
    ///
    /// `label` names the operation in log lines.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.attempts();
        let mut backoff = Backoff::new(self);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    tracing::error!("{label} failed after {attempt} attempt(s): {e}");
                    return Err(e);
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        "{label} failed: {e}. Retrying in {delay:?} (attempt {attempt}/{attempts})"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run a blocking operation under this policy, sleeping the current thread.
    pub fn run_blocking<T, E, F>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        let attempts = self.attempts();
        let mut backoff = Backoff::new(self);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    tracing::error!("{label} failed after {attempt} attempt(s): {e}");
                    return Err(e);
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        "{label} failed: {e}. Retrying in {delay:?} (attempt {attempt}/{attempts})"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.initial_delay_ms),
            settings.backoff_factor,
            Duration::from_millis(settings.max_delay_ms),
        )
    }
}

/// Delay state for one retried call.
struct Backoff {
    current: Duration,
    factor: f64,
    cap: Duration,
}

impl Backoff {
    fn new(policy: &RetryPolicy) -> Self {
        Self {
            current: policy.initial_delay,
            factor: policy.backoff_factor,
            cap: policy.max_delay,
        }
    }

    /// Return the capped delay for this retry and grow the next one.
    fn next_delay(&mut self) -> Duration {
        let delay = self.current.min(self.cap);
        // Clamp growth at the cap so long schedules never overflow.
        self.current = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.factor)
            .unwrap_or(self.cap)
            .min(self.cap);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    struct Failure(u32);

    impl Display for Failure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "failure #{}", self.0)
        }
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            RetryPolicy::encode().delays(),
            vec![Duration::from_secs(4), Duration::from_secs(8)]
        );
        assert_eq!(
            RetryPolicy::summarize().delays(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
        assert!(RetryPolicy::none().delays().is_empty());
    }

    #[test]
    fn test_delays_capped() {
        let policy = RetryPolicy::new(5, Duration::from_secs(4), 2.0, Duration::from_secs(10));
        assert_eq!(
            policy.delays(),
            vec![
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = RetrySettings {
            max_attempts: 4,
            initial_delay_ms: 250,
            backoff_factor: 3.0,
            max_delay_ms: 1000,
        };
        let policy = RetryPolicy::from(&settings);
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(
            policy.delays(),
            vec![
                Duration::from_millis(250),
                Duration::from_millis(750),
                Duration::from_millis(1000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_after_failures() {
        let policy = RetryPolicy::summarize();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = tokio::time::Instant::now();

        let result: Result<&str, Failure> = policy
            .run("flaky", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= 2 {
                    Err(Failure(n))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s + 4s of backoff, nothing else.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(6050), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_single_failure_waits_initial_delay() {
        let policy = RetryPolicy::encode();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = tokio::time::Instant::now();

        let result: Result<u32, Failure> = policy
            .run("once", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    Err(Failure(n))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(4050), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhaustion_returns_last_error() {
        let policy = RetryPolicy::encode();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), Failure> = policy
            .run("always", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(Failure(n))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result, Err(Failure(3)));
    }

    #[tokio::test]
    async fn test_run_first_try_does_not_sleep() {
        let policy = RetryPolicy::encode();
        let start = std::time::Instant::now();
        let result: Result<u8, Failure> = policy.run("ok", || async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_run_blocking_exhaustion() {
        let policy = RetryPolicy::new(4, Duration::from_millis(1), 2.0, Duration::from_millis(2));
        let mut calls = 0;
        let result: Result<(), Failure> = policy.run_blocking("blocking", || {
            calls += 1;
            Err(Failure(calls))
        });
        assert_eq!(calls, 4);
        assert_eq!(result, Err(Failure(4)));
    }

    #[test]
    fn test_run_blocking_recovers() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), 2.0, Duration::from_millis(5));
        let mut calls = 0;
        let result: Result<u32, Failure> = policy.run_blocking("blocking", || {
            calls += 1;
            if calls < 3 {
                Err(Failure(calls))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn test_zero_attempts_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1), 2.0, Duration::from_millis(1));
        let mut calls = 0;
        let result: Result<(), Failure> = policy.run_blocking("zero", || {
            calls += 1;
            Err(Failure(calls))
        });
        assert_eq!(calls, 1);
        assert_eq!(result, Err(Failure(1)));
    }
}
