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

//! Defines traits for retry policies and some common implementations.
//!
//! The client libraries automatically retry requests when they fail due to
//! transient errors, such as timeouts, refused or reset connections, and
//! some server errors. Requests that end with a truncated response are only
//! retried when they are idempotent, that is, when it is safe to perform the
//! request more than once.
//!
//! # Example
//! ```
//! # use stackit_core::retry_policy::*;
//! let policy = TransientErrors.with_attempt_limit(3);
//! ```

use crate::error::Error;
use crate::retry_result::RetryResult;
use std::sync::Arc;

/// Determines how errors are handled in the retry loop.
///
/// Implementations of this trait determine if errors are retryable, and for
/// how long the retry loop may continue.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Query the retry policy after an error.
    ///
    /// # Parameters
    /// * `loop_start` - when the retry loop started.
    /// * `attempt_count` - the number of attempts. This includes the initial
    ///   attempt. This method called after the first attempt, so the
    ///   value is always non-zero.
    /// * `idempotent` - if `true` assume the operation is idempotent. More
    ///   errors are retryable on idempotent operations.
    /// * `error` - the last error when attempting the request. Server errors
    ///   (`5xx`) are represented as [Error::http].
    fn on_error(
        &self,
        loop_start: std::time::Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult;
}

/// A helper type to use [RetryPolicy] in client options.
#[derive(Clone, Debug)]
pub struct RetryPolicyArg(pub(crate) Arc<dyn RetryPolicy>);

impl<T: RetryPolicy + 'static> std::convert::From<T> for RetryPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn RetryPolicy>> for RetryPolicyArg {
    fn from(value: Arc<dyn RetryPolicy>) -> Self {
        Self(value)
    }
}

/// Extension trait for [RetryPolicy].
pub trait RetryPolicyExt: RetryPolicy + Sized {
    /// Decorate a [RetryPolicy] to limit the number of attempts.
    ///
    /// # Example
    /// ```
    /// # use stackit_core::retry_policy::*;
    /// let policy = TransientErrors.with_attempt_limit(3);
    /// assert_eq!(policy.maximum_attempts(), 3);
    /// ```
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: RetryPolicy> RetryPolicyExt for T {}

/// A retry policy that continues on transient errors.
///
/// This policy should be decorated to limit the number of retry attempts, see
/// [RetryPolicyExt::with_attempt_limit].
///
/// The policy continues on:
/// - timeouts,
/// - refused, aborted, or reset connections,
/// - the `500`, `502`, and `504` status codes,
/// - transient errors creating the authentication headers, as the request
///   never left the client,
/// - truncated responses, but only for idempotent requests.
///
/// All other errors are permanent.
#[derive(Clone, Debug, Default)]
pub struct TransientErrors;

impl RetryPolicy for TransientErrors {
    fn on_error(
        &self,
        _loop_start: std::time::Instant,
        _attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        if error.is_timeout() || error.is_connection() || error.is_transient_credentials_error() {
            return RetryResult::Continue(error);
        }
        if error.is_unexpected_eof() {
            return if idempotent {
                RetryResult::Continue(error)
            } else {
                RetryResult::Permanent(error)
            };
        }
        match error.http_status_code() {
            Some(500) | Some(502) | Some(504) => RetryResult::Continue(error),
            _ => RetryResult::Permanent(error),
        }
    }
}

/// A retry policy decorator that limits the number of attempts.
///
/// This policy decorates an inner policy and limits the total number of
/// attempts, including the initial one. Note that `on_error()` is not called
/// before the initial (non-retry) attempt. Therefore, setting the maximum
/// number of attempts to 0 or 1 results in no retry attempts.
///
/// The policy passes through the results from the inner policy as long as
/// `attempt_count < maximum_attempts`. Once the maximum number of attempts is
/// reached, the policy replaces any [Continue][RetryResult::Continue] result
/// with [Exhausted][RetryResult::Exhausted].
///
/// # Example
/// ```
/// # use stackit_core::*;
/// # use stackit_core::retry_policy::*;
/// # use stackit_core::retry_result::RetryResult;
/// let policy = LimitedAttemptCount::new(3);
/// let now = std::time::Instant::now();
/// assert!(policy.on_error(now, 1, true, transient_error()).is_continue());
/// assert!(policy.on_error(now, 2, true, transient_error()).is_continue());
/// assert!(policy.on_error(now, 3, true, transient_error()).is_exhausted());
///
/// fn transient_error() -> error::Error {
///     error::Error::http(502, http::HeaderMap::new(), bytes::Bytes::from_static(b"bad gateway"))
/// }
/// ```
#[derive(Clone, Debug)]
pub struct LimitedAttemptCount<P = TransientErrors>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Creates a new [TransientErrors] policy limited to `maximum_attempts`.
    pub fn new(maximum_attempts: u32) -> Self {
        Self {
            inner: TransientErrors,
            maximum_attempts,
        }
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    /// Decorates `policy` to limit the number of attempts.
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }

    pub fn maximum_attempts(&self) -> u32 {
        self.maximum_attempts
    }
}

impl<P> RetryPolicy for LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    fn on_error(
        &self,
        loop_start: std::time::Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> RetryResult {
        match self
            .inner
            .on_error(loop_start, attempt_count, idempotent, error)
        {
            RetryResult::Continue(e) if attempt_count >= self.maximum_attempts => {
                RetryResult::Exhausted(e)
            }
            result => result,
        }
    }
}
