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

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::response::HttpResponse;
use crate::retry_policy::RetryPolicy;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Runs the retry loop for a given function.
///
/// This functions calls an inner function as long as (1) the retry policy has
/// not expired, and (2) the inner function has not returned a final result.
///
/// Transport errors and server error responses (`5xx`) are presented to the
/// retry policy. Any other response is final and returned immediately.
///
/// When the policy stops the loop the last observation is returned: the last
/// response if the attempt received one, otherwise the last error.
///
/// In between calls the function waits the amount of time prescribed by the
/// backoff policy, using `sleep` to implement any sleep.
pub(crate) async fn retry_loop<F, Fut, S, SF>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<HttpResponse>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<HttpResponse>> + Send,
    S: Fn(Duration) -> SF + Send,
    SF: Future<Output = ()> + Send,
{
    let loop_start = tokio::time::Instant::now().into_std();
    let mut attempt_count = 0;
    loop {
        attempt_count += 1;
        let (response, error) = match inner().await {
            Ok(r) if !r.status().is_server_error() => return Ok(r),
            Ok(r) => {
                let error = r.to_error();
                (Some(r), error)
            }
            Err(e) => (None, e),
        };
        let decision = retry_policy.on_error(loop_start, attempt_count, idempotent, error);
        if !decision.is_continue() {
            let error = decision.into_error();
            tracing::debug!(attempt_count, "stopping retry loop: {error}");
            return response.ok_or(error);
        }
        let delay = backoff_policy.on_failure(loop_start, attempt_count);
        tracing::warn!(
            attempt_count,
            ?delay,
            "retrying after transient error: {}",
            decision.error()
        );
        sleep(delay).await;
    }
}
