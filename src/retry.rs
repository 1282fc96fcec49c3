//! Bounded retry loop around the request executor.

use std::future::Future;

use crate::{
    backoff::{backoff_delay, with_jitter},
    executor::run_attempt,
    LoggerError, Result, RetryConfig,
};

/// Classified result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    RetryableFailure(LoggerError),
    FatalFailure(LoggerError),
}

impl<T> From<Result<T>> for AttemptOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) if err.is_retryable() => Self::RetryableFailure(err),
            Err(err) => Self::FatalFailure(err),
        }
    }
}

/// Calls `attempt` until it succeeds, fails fatally, or the attempt budget
/// (`config.max_retries`) is spent.
///
/// Every call of `attempt` runs under `config.timeout`. Between retryable
/// failures the loop sleeps for the jittered exponential backoff. The
/// returned error is the cause of the last attempt; how it is surfaced is up
/// to the caller.
pub async fn execute_with_retry<T, F, Fut>(config: &RetryConfig, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let budget = config.attempt_budget();
    let mut attempts = 0u32;
    loop {
        let outcome = AttemptOutcome::from(run_attempt(config.timeout, attempt()).await);
        attempts += 1;

        let err = match outcome {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::FatalFailure(err) => return Err(err),
            AttemptOutcome::RetryableFailure(err) if attempts >= budget => return Err(err),
            AttemptOutcome::RetryableFailure(err) => err,
        };

        let delay = with_jitter(backoff_delay(attempts, config.base_delay, config.max_delay));
        tracing::warn!(
            attempt = attempts,
            max_attempts = budget,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying request"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::{Duration, Instant};

    use super::{execute_with_retry, AttemptOutcome};
    use crate::{LoggerError, RetryConfig};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            timeout: Duration::from_secs(1),
            verbose: false,
        }
    }

    fn unavailable() -> LoggerError {
        LoggerError::Http {
            status: 503,
            body: "try later".to_owned(),
        }
    }

    #[test]
    fn outcome_classifies_errors() {
        assert!(matches!(AttemptOutcome::from(Ok(1)), AttemptOutcome::Success(1)));
        assert!(matches!(
            AttemptOutcome::<()>::from(Err(unavailable())),
            AttemptOutcome::RetryableFailure(_)
        ));
        assert!(matches!(
            AttemptOutcome::<()>::from(Err(LoggerError::MalformedResponse("x".to_owned()))),
            AttemptOutcome::FatalFailure(_)
        ));
    }

    #[tokio::test]
    async fn first_success_stops_the_loop() {
        let calls = &AtomicU32::new(0);
        let value = execute_with_retry(&fast_config(5), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("done")
        })
        .await
        .expect("must succeed");

        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persistent_retryable_failure_uses_whole_budget() {
        for budget in [1, 2, 3, 5] {
            let calls = &AtomicU32::new(0);
            let err = execute_with_retry::<(), _, _>(&fast_config(budget), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await
            .expect_err("must fail");

            assert_eq!(err.status(), Some(503));
            assert_eq!(calls.load(Ordering::SeqCst), budget);
        }
    }

    #[tokio::test]
    async fn fatal_failure_is_never_retried() {
        let calls = &AtomicU32::new(0);
        let err = execute_with_retry::<(), _, _>(&fast_config(5), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LoggerError::Http {
                status: 404,
                body: "no such event".to_owned(),
            })
        })
        .await
        .expect_err("must fail");

        assert_eq!(err.status(), Some(404));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let value = execute_with_retry(&fast_config(3), move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(LoggerError::Network("connection reset".to_owned())),
                1 => Err(LoggerError::Http {
                    status: 429,
                    body: String::new(),
                }),
                _ => Ok(42),
            }
        })
        .await
        .expect("third attempt must succeed");

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn timed_out_attempts_are_retried() {
        let calls = &AtomicU32::new(0);
        let config = RetryConfig {
            timeout: Duration::from_millis(20),
            ..fast_config(2)
        };
        let value = execute_with_retry(&config, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(())
        })
        .await;

        assert!(value.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_budget_still_makes_one_attempt() {
        let calls = &AtomicU32::new(0);
        let _ = execute_with_retry::<(), _, _>(&fast_config(0), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(unavailable())
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sleeps_for_backoff_between_attempts() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(30),
            timeout: Duration::from_secs(1),
            verbose: false,
        };
        let started = Instant::now();
        let _ = execute_with_retry::<(), _, _>(&config, || async { Err(unavailable()) }).await;

        // 20ms after the first failure, min(40, 30) = 30ms after the second.
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
