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
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// How a [StatusPolicy] treats "not found" errors, that is, HTTP 404 and
/// HTTP 410 responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotFound {
    /// The error is returned to the caller.
    #[default]
    Fail,
    /// The operation completed without a value. Used when waiting for
    /// deletions.
    Success,
    /// The operation is still in progress. Some services briefly return
    /// 404 for resources that were just created.
    Continue,
}

/// Classifies the state of a resource reported by a STACKIT service.
///
/// Most wait handlers fetch a resource, look at a status field, and decide
/// whether the operation succeeded, failed, or is still running. This type
/// captures those decisions so each handler only declares the states of its
/// resource.
///
/// Status values are compared without regard to ASCII case. Values that
/// appear in none of the configured sets are treated as in progress.
///
/// # Example
/// ```
/// # use stackit_wait::{PollingResult, StatusPolicy};
/// let policy = StatusPolicy::new("project")
///     .with_success(&["ACTIVE"])
///     .with_failure(&["FAILED"]);
/// let got = policy.evaluate(Ok("CREATING"), |s| Some(*s));
/// assert!(matches!(got, Ok(PollingResult::InProgress)));
/// let got = policy.evaluate(Ok("ACTIVE"), |s| Some(*s));
/// assert!(matches!(got, Ok(PollingResult::Completed(Some("ACTIVE")))));
/// let got = policy.evaluate(Ok("FAILED"), |s| Some(*s));
/// assert!(got.is_err());
/// ```
#[derive(Clone, Debug)]
pub struct StatusPolicy {
    resource: &'static str,
    success: &'static [&'static str],
    failure: &'static [&'static str],
    in_progress: &'static [&'static str],
    transient: Option<fn(&Error) -> bool>,
    not_found: NotFound,
    failure_budget: Option<u32>,
    failures: Arc<AtomicU32>,
}

impl StatusPolicy {
    /// Creates a policy for the given kind of resource.
    ///
    /// The resource name is only used in log and error messages.
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            success: &[],
            failure: &[],
            in_progress: &[],
            transient: None,
            not_found: NotFound::default(),
            failure_budget: None,
            failures: Arc::new(AtomicU32::new(0)),
        }
    }

    /// The states where the operation completed successfully.
    pub fn with_success(mut self, v: &'static [&'static str]) -> Self {
        self.success = v;
        self
    }

    /// The states where the operation failed.
    pub fn with_failure(mut self, v: &'static [&'static str]) -> Self {
        self.failure = v;
        self
    }

    /// The states where the operation is known to be running.
    ///
    /// Unknown states are also treated as in progress, this set only changes
    /// the log messages.
    pub fn with_in_progress(mut self, v: &'static [&'static str]) -> Self {
        self.in_progress = v;
        self
    }

    /// Errors matching `v` do not stop the wait.
    pub fn with_transient(mut self, v: fn(&Error) -> bool) -> Self {
        self.transient = Some(v);
        self
    }

    /// Changes how "not found" errors are treated.
    pub fn with_not_found(mut self, v: NotFound) -> Self {
        self.not_found = v;
        self
    }

    /// Tolerates up to `v - 1` observations of a failure state.
    ///
    /// Some resources report a failure state while they recover, for example,
    /// a cluster may be `UNHEALTHY` while its nodes start. With a budget of
    /// `v` the policy fails on the `v`-th observation.
    pub fn with_failure_budget(mut self, v: u32) -> Self {
        self.failure_budget = Some(v);
        self
    }

    /// Forgets the failure states observed so far.
    ///
    /// Wait handlers call this at the start of each wait, so every wait gets
    /// the full failure budget.
    pub fn reset(&self) {
        self.failures.store(0, Ordering::SeqCst);
    }

    /// Classifies a single observation of the resource.
    ///
    /// # Parameters
    /// * `fetched` - the result of fetching the resource.
    /// * `status` - extracts the status from the resource.
    pub fn evaluate<T, F>(&self, fetched: Result<T>, status: F) -> Result<PollingResult<T>>
    where
        F: FnOnce(&T) -> Option<&str>,
    {
        let resource = match fetched {
            Ok(r) => r,
            Err(e) => return self.on_error(e),
        };
        let Some(state) = status(&resource).map(str::to_ascii_uppercase) else {
            return Err(Error::deser(format!(
                "the {} response does not include a status",
                self.resource
            )));
        };
        if contains(self.success, &state) {
            tracing::debug!(resource = self.resource, state = %state, "operation completed");
            return Ok(PollingResult::Completed(Some(resource)));
        }
        if contains(self.failure, &state) {
            return self.on_failure(state);
        }
        if !contains(self.in_progress, &state) {
            tracing::debug!(
                resource = self.resource,
                state = %state,
                "unknown state, assuming in progress"
            );
        }
        Ok(PollingResult::InProgress)
    }

    /// Classifies an error returned while fetching the resource.
    pub fn on_error<T>(&self, error: Error) -> Result<PollingResult<T>> {
        if error.is_not_found() {
            match self.not_found {
                NotFound::Fail => {}
                NotFound::Success => return Ok(PollingResult::Completed(None)),
                NotFound::Continue => {
                    tracing::debug!(resource = self.resource, "not found yet, continue polling");
                    return Ok(PollingResult::InProgress);
                }
            }
        }
        if self.transient.is_some_and(|f| f(&error)) {
            tracing::warn!(resource = self.resource, "ignoring transient error: {error}");
            return Ok(PollingResult::InProgress);
        }
        Err(error)
    }

    fn on_failure<T>(&self, state: String) -> Result<PollingResult<T>> {
        if let Some(budget) = self.failure_budget {
            let seen = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
            if seen < budget {
                tracing::warn!(
                    resource = self.resource,
                    state = %state,
                    seen,
                    budget,
                    "failure state observed, continue polling"
                );
                return Ok(PollingResult::InProgress);
            }
        }
        Err(Error::operation_failed(format!(
            "received status {state} from server for {}",
            self.resource
        )))
    }
}

fn contains(set: &[&str], state: &str) -> bool {
    set.iter().any(|s| s.eq_ignore_ascii_case(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use test_case::test_case;

    #[derive(Debug, PartialEq)]
    struct Resource {
        status: Option<String>,
    }

    fn resource(status: &str) -> Result<Resource> {
        Ok(Resource {
            status: Some(status.to_string()),
        })
    }

    fn http_error(code: u16) -> Error {
        Error::http(code, HeaderMap::new(), bytes::Bytes::new())
    }

    fn policy() -> StatusPolicy {
        StatusPolicy::new("test-resource")
            .with_success(&["ACTIVE"])
            .with_failure(&["FAILED", "ERROR"])
            .with_in_progress(&["CREATING"])
    }

    fn status(r: &Resource) -> Option<&str> {
        r.status.as_deref()
    }

    #[test_case("ACTIVE"; "upper")]
    #[test_case("Active"; "mixed")]
    fn success(state: &str) {
        let got = policy().evaluate(resource(state), status);
        assert!(
            matches!(&got, Ok(PollingResult::Completed(Some(r))) if r.status.as_deref() == Some(state)),
            "{got:?}"
        );
    }

    #[test_case("FAILED")]
    #[test_case("Error")]
    fn failure(state: &str) {
        let got = policy().evaluate(resource(state), status);
        let err = got.unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
        let want = format!("received status {} from server", state.to_ascii_uppercase());
        assert!(err.to_string().contains(&want), "{err}");
    }

    #[test_case("CREATING")]
    #[test_case("SOMETHING_NEW")]
    #[test_case("")]
    fn in_progress(state: &str) {
        let got = policy().evaluate(resource(state), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
    }

    #[test]
    fn missing_status() {
        let got = policy().evaluate(Ok(Resource { status: None }), status);
        let err = got.unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
    }

    #[test_case(NotFound::Fail, 404)]
    #[test_case(NotFound::Fail, 410)]
    fn not_found_fails(not_found: NotFound, code: u16) {
        let got = policy()
            .with_not_found(not_found)
            .evaluate(Err(http_error(code)), status);
        let err = got.unwrap_err();
        assert_eq!(err.http_status_code(), Some(code), "{err:?}");
    }

    #[test_case(404)]
    #[test_case(410)]
    fn not_found_success(code: u16) {
        let got = policy()
            .with_not_found(NotFound::Success)
            .evaluate(Err(http_error(code)), status);
        assert!(matches!(got, Ok(PollingResult::Completed(None))), "{got:?}");
    }

    #[test]
    fn not_found_continue() {
        let got = policy()
            .with_not_found(NotFound::Continue)
            .evaluate(Err(http_error(404)), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
    }

    #[test]
    fn not_found_does_not_hide_other_errors() {
        let got = policy()
            .with_not_found(NotFound::Success)
            .evaluate(Err(http_error(403)), status);
        let err = got.unwrap_err();
        assert_eq!(err.http_status_code(), Some(403), "{err:?}");
    }

    #[test]
    fn transient_errors() {
        let policy = policy().with_transient(|e| e.http_status_code() == Some(400));
        let got = policy.evaluate(Err(http_error(400)), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
        let got = policy.evaluate(Err(http_error(500)), status);
        let err = got.unwrap_err();
        assert_eq!(err.http_status_code(), Some(500), "{err:?}");
    }

    #[test]
    fn errors_are_not_transient_by_default() {
        let got = policy().evaluate(Err(http_error(503)), status);
        let err = got.unwrap_err();
        assert_eq!(err.http_status_code(), Some(503), "{err:?}");
    }

    #[test]
    fn failure_budget() {
        let policy = policy().with_failure_budget(3);
        let got = policy.evaluate(resource("FAILED"), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
        // Clones share the budget.
        let clone = policy.clone();
        let got = clone.evaluate(resource("FAILED"), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
        let got = policy.evaluate(resource("FAILED"), status);
        let err = got.unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
    }

    #[test]
    fn failure_budget_reset() {
        let policy = policy().with_failure_budget(2);
        let got = policy.evaluate(resource("FAILED"), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
        policy.clone().reset();
        let got = policy.evaluate(resource("FAILED"), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
        let got = policy.evaluate(resource("FAILED"), status);
        let err = got.unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
    }

    #[test]
    fn failure_budget_does_not_delay_success() {
        let policy = policy().with_failure_budget(3);
        let got = policy.evaluate(resource("FAILED"), status);
        assert!(matches!(got, Ok(PollingResult::InProgress)), "{got:?}");
        let got = policy.evaluate(resource("ACTIVE"), status);
        assert!(matches!(got, Ok(PollingResult::Completed(Some(_)))), "{got:?}");
    }
}
