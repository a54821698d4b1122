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


//! The decision returned by a [RetryPolicy][crate::retry_policy::RetryPolicy].

use crate::error::Error;

/// What the retry loop does after a failed attempt.
///
/// Every variant carries the error of the failed attempt, so the loop can
/// report it when it stops.
///
/// # Example
///
/// ```
/// # use stackit_core::error::Error;
/// # use stackit_core::retry_policy::RetryPolicy;
/// # use stackit_core::retry_result::RetryResult;
/// #[derive(Debug)]
/// struct FiveAttempts;
/// impl RetryPolicy for FiveAttempts {
///     fn on_error(
///         &self,
///         _loop_start: std::time::Instant,
///         attempt_count: u32,
///         _idempotent: bool,
///         error: Error) -> RetryResult
///     {
///         if !error.is_transient() {
///             return RetryResult::Permanent(error);
///         }
///         if attempt_count >= 5 {
///             return RetryResult::Exhausted(error);
///         }
///         RetryResult::Continue(error)
///     }
/// }
/// ```
#[derive(Debug)]
pub enum RetryResult {
    /// Retrying cannot fix this error.
    Permanent(Error),

    /// The error is retryable but the policy ran out of attempts or time.
    Exhausted(Error),

    /// Sleep and try again.
    Continue(Error),
}

impl RetryResult {
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// The error of the failed attempt.
    pub fn error(&self) -> &Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }

    /// Consumes the decision, returning the error of the failed attempt.
    pub fn into_error(self) -> Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn forbidden() -> Error {
        Error::http(403, http::HeaderMap::new(), bytes::Bytes::from_static(b"forbidden"))
    }

    fn bad_gateway() -> Error {
        Error::http(502, http::HeaderMap::new(), bytes::Bytes::from_static(b"bad gateway"))
    }

    #[test_case(RetryResult::Permanent(forbidden()), (true, false, false))]
    #[test_case(RetryResult::Exhausted(bad_gateway()), (false, true, false))]
    #[test_case(RetryResult::Continue(bad_gateway()), (false, false, true))]
    fn predicates(decision: RetryResult, want: (bool, bool, bool)) {
        let got = (
            decision.is_permanent(),
            decision.is_exhausted(),
            decision.is_continue(),
        );
        assert_eq!(got, want, "{decision:?}");
    }

    #[test]
    fn error_accessors() {
        let decision = RetryResult::Exhausted(bad_gateway());
        assert_eq!(decision.error().http_status_code(), Some(502));
        let error = decision.into_error();
        assert_eq!(error.http_status_code(), Some(502), "{error:?}");

        let error = RetryResult::Permanent(forbidden()).into_error();
        assert_eq!(error.http_status_code(), Some(403), "{error:?}");
    }
}
