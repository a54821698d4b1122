// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::{Error, PollingResult, Result};
use futures::future::BoxFuture;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The default time between two checks of the operation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The default time limit for the full wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

type Predicate<T> =
    Box<dyn FnMut(PollContext) -> BoxFuture<'static, Result<PollingResult<T>>> + Send>;

/// The state of the running wait, as seen by one check.
///
/// Predicates that run their own nested wait use it to observe the caller's
/// cancellation and to stay within the remaining time.
#[derive(Clone, Debug)]
pub struct PollContext {
    attempt: u32,
    deadline: Instant,
    cancel: CancellationToken,
}

impl PollContext {
    /// The number of this check, starting at 1 for each call to `wait()`.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// When the running wait times out.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// The time left before the running wait times out.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// A token cancelled when the running wait is cancelled.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Polls an asynchronous operation until it reaches a terminal state.
///
/// The handler calls a predicate closure once per polling interval. The
/// predicate returns [PollingResult::InProgress] to continue waiting,
/// [PollingResult::Completed] to stop, or an error to abort the wait.
///
/// The handler does not remember the outcome of previous waits. Calling
/// [wait][AsyncActionHandler::wait] again starts a new polling loop.
///
/// # Example
/// ```
/// # use stackit_wait::{AsyncActionHandler, PollingResult};
/// # use std::sync::atomic::{AtomicU32, Ordering};
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # tokio_test::block_on(async {
/// let calls = Arc::new(AtomicU32::new(0));
/// let counter = calls.clone();
/// let mut handler = AsyncActionHandler::new(move || {
///     let n = counter.fetch_add(1, Ordering::SeqCst);
///     async move {
///         if n < 2 {
///             return Ok(PollingResult::InProgress);
///         }
///         Ok(PollingResult::Completed(Some(n)))
///     }
/// });
/// handler
///     .set_poll_interval(Duration::from_millis(1))
///     .set_timeout(Duration::from_secs(10));
/// assert_eq!(handler.wait().await?, Some(2));
/// # stackit_core::Result::<()>::Ok(()) });
/// ```
pub struct AsyncActionHandler<T> {
    predicate: Predicate<T>,
    poll_interval: Duration,
    timeout: Duration,
    sleep_before_wait: Duration,
}

impl<T> std::fmt::Debug for AsyncActionHandler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncActionHandler")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .field("sleep_before_wait", &self.sleep_before_wait)
            .finish_non_exhaustive()
    }
}

impl<T> AsyncActionHandler<T>
where
    T: Send + 'static,
{
    /// Creates a handler from the predicate used to check the operation.
    pub fn new<F, Fut>(mut predicate: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<PollingResult<T>>> + Send + 'static,
    {
        Self::with_context(move |_| predicate())
    }

    /// Creates a handler from a predicate that receives the [PollContext] of
    /// the running wait.
    pub fn with_context<F, Fut>(mut predicate: F) -> Self
    where
        F: FnMut(PollContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<PollingResult<T>>> + Send + 'static,
    {
        Self {
            predicate: Box::new(move |context| Box::pin(predicate(context))),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            sleep_before_wait: Duration::ZERO,
        }
    }

    /// Changes the time between two checks of the operation.
    pub fn set_poll_interval(&mut self, v: Duration) -> &mut Self {
        self.poll_interval = v;
        self
    }

    /// Changes the time limit for the full wait, including any initial delay.
    pub fn set_timeout(&mut self, v: Duration) -> &mut Self {
        self.timeout = v;
        self
    }

    /// Delays the first check of the operation.
    ///
    /// Some services take a few seconds before the resource reflects a
    /// request. Checking too early may observe the state before the change.
    pub fn set_sleep_before_wait(&mut self, v: Duration) -> &mut Self {
        self.sleep_before_wait = v;
        self
    }

    /// Returns the time between two checks of the operation.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the time limit for the full wait.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Polls the operation until it completes or the wait times out.
    pub async fn wait(&mut self) -> Result<Option<T>> {
        self.wait_with_cancellation(&CancellationToken::new()).await
    }

    /// Polls the operation until it completes, the wait times out, or
    /// `cancel` is triggered.
    ///
    /// The predicate is not interrupted while it runs. Cancellation and the
    /// timeout are observed while the handler sleeps between checks.
    pub async fn wait_with_cancellation(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        if self.poll_interval.is_zero() {
            return Err(Error::configuration("the poll interval must be positive"));
        }
        let deadline = Instant::now() + self.timeout;
        if !self.sleep_before_wait.is_zero() {
            pause(self.sleep_before_wait, deadline, self.timeout, cancel).await?;
        }
        let mut attempt = 0_u32;
        loop {
            attempt += 1;
            let context = PollContext {
                attempt,
                deadline,
                cancel: cancel.child_token(),
            };
            match (self.predicate)(context).await {
                Err(e) => {
                    tracing::debug!(attempt, "check failed: {e}");
                    return Err(e);
                }
                Ok(PollingResult::Completed(value)) => {
                    tracing::debug!(attempt, "operation completed");
                    return Ok(value);
                }
                Ok(PollingResult::InProgress) => {
                    tracing::debug!(attempt, "operation in progress");
                }
            }
            pause(self.poll_interval, deadline, self.timeout, cancel).await?;
        }
    }
}

async fn pause(
    delay: Duration,
    deadline: Instant,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled("the wait was cancelled")),
        _ = tokio::time::sleep_until(deadline) => {
            let msg = format!("the operation did not complete within {timeout:?}");
            tracing::warn!("{msg}");
            Err(Error::wait_timeout(msg))
        }
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
