//! Retry/backoff executor
//!
//! Wraps every remote call. A transient failure (rate limit, header timeout)
//! is followed by a fixed backoff and a fresh attempt, with no attempt cap.
//! Any other failure is returned to the caller on the first occurrence.

use crate::clock::Clock;
use crate::error::Error;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Fixed wait after a transient failure (10 minutes)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(600_000);

/// Progress of a single `execute` call
#[derive(Debug)]
pub enum RetryState<T> {
    /// About to invoke the operation (1-based attempt number)
    Attempting { attempt: u32 },
    /// Last attempt failed transiently; waiting before the next one
    Backoff { attempt: u32, error: Error },
    /// Operation succeeded
    Done(T),
    /// Operation failed with a non-transient error
    Failed(Error),
}

#[derive(Clone)]
pub struct RetryExecutor {
    clock: Arc<dyn Clock>,
    delay: Duration,
}

impl RetryExecutor {
    pub fn new(clock: Arc<dyn Clock>, delay: Duration) -> Self {
        Self { clock, delay }
    }

    /// Run `operation` until it succeeds or fails with a non-transient error.
    ///
    /// `context` names the call site and is attached to the retry warning.
    pub async fn execute<T, F, Fut>(&self, context: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = RetryState::Attempting { attempt: 1 };
        loop {
            state = match state {
                RetryState::Attempting { attempt } => match operation().await {
                    Ok(value) => RetryState::Done(value),
                    Err(error) if error.is_transient() => RetryState::Backoff { attempt, error },
                    Err(error) => RetryState::Failed(error),
                },
                RetryState::Backoff { attempt, error } => {
                    tracing::warn!(
                        context = context,
                        attempt = attempt,
                        error = %error,
                        wait_secs = self.delay.as_secs(),
                        "Retry: {} - {}. Waiting {}s...",
                        context,
                        error,
                        self.delay.as_secs()
                    );
                    self.clock.sleep(self.delay).await;
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Done(value) => return Ok(value),
                RetryState::Failed(error) => return Err(error),
            };
        }
    }
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("delay", &self.delay)
            .finish()
    }
}
