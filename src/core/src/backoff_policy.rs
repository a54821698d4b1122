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

//! Defines traits for backoff policies and a common implementation.
//!
//! The client libraries automatically retry requests that fail due to
//! transient errors. Retry strategies should avoid immediately retrying a
//! request, as the service may need time to recover.
//!
//! The STACKIT services document a fixed delay between attempts, without
//! jitter. [FixedBackoff] implements this strategy.
//!
//! # Example
//! ```
//! # use stackit_core::backoff_policy::*;
//! use std::time::Duration;
//! let policy = FixedBackoff::new(Duration::from_secs(2));
//! let delay = policy.on_failure(std::time::Instant::now(), 1);
//! assert_eq!(delay, Duration::from_secs(2));
//! ```

use std::sync::Arc;
use std::time::Duration;

/// Defines the trait implemented by all backoff strategies.
pub trait BackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the backoff delay on a failure.
    ///
    /// # Parameters
    /// * `loop_start` - when the retry loop started.
    /// * `attempt_count` - the number of attempts. This method is always called
    ///   after the first attempt.
    fn on_failure(&self, loop_start: std::time::Instant, attempt_count: u32) -> Duration;
}

/// A backoff policy that waits the same amount of time after every failure.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl BackoffPolicy for FixedBackoff {
    fn on_failure(&self, _loop_start: std::time::Instant, _attempt_count: u32) -> Duration {
        self.delay
    }
}

/// A helper type to use [BackoffPolicy] in client options.
#[derive(Clone, Debug)]
pub struct BackoffPolicyArg(pub(crate) Arc<dyn BackoffPolicy>);

impl<T: BackoffPolicy + 'static> std::convert::From<T> for BackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn BackoffPolicy>> for BackoffPolicyArg {
    fn from(value: Arc<dyn BackoffPolicy>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed() {
        let policy = FixedBackoff::new(Duration::from_millis(250));
        let now = std::time::Instant::now();
        for attempt in 1..5 {
            assert_eq!(policy.on_failure(now, attempt), Duration::from_millis(250));
        }
        assert_eq!(policy.delay(), Duration::from_millis(250));
    }

    // Verify `BackoffPolicyArg` can be converted from the desired types.
    #[test]
    fn backoff_policy_arg() {
        let policy = FixedBackoff::new(Duration::from_secs(1));
        let _ = BackoffPolicyArg::from(policy);

        let policy: Arc<dyn BackoffPolicy> = Arc::new(FixedBackoff::new(Duration::from_secs(1)));
        let _ = BackoffPolicyArg::from(policy);
    }
}
