//! Runs a single transport attempt under a wall-clock deadline.

use std::future::Future;
use std::time::Duration;

use crate::{LoggerError, Result};

/// Awaits `attempt` for at most `timeout`.
///
/// When the deadline elapses first the attempt future is dropped, which
/// cancels the in-flight request, and [`LoggerError::Timeout`] is returned.
/// Failures raised by the attempt itself are passed through untouched.
pub async fn run_attempt<T, Fut>(timeout: Duration, attempt: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_elapsed) => Err(LoggerError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use std::time::Duration;

    use super::run_attempt;
    use crate::LoggerError;

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn returns_value_when_attempt_finishes_in_time() {
        let value = run_attempt(Duration::from_secs(1), async { Ok(7) })
            .await
            .expect("attempt must succeed");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn passes_attempt_failures_through() {
        let err = run_attempt::<(), _>(Duration::from_secs(1), async {
            Err(LoggerError::Http {
                status: 404,
                body: "not found".to_owned(),
            })
        })
        .await
        .expect_err("attempt must fail");
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn elapsed_deadline_cancels_attempt() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(dropped.clone());
        let timeout = Duration::from_millis(20);

        let err = run_attempt(timeout, async move {
            let _flag = flag;
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await
        .expect_err("attempt must time out");

        assert!(matches!(err, LoggerError::Timeout(after) if after == timeout));
        assert!(dropped.load(Ordering::SeqCst));
    }
}
