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

//! Client configuration shared by all services.
//!
//! Each service has a compiled default base URL, which depends on the target
//! [Environment]. Applications can override the base URL in code, or using an
//! environment variable of the form `STACKIT_<SERVICE>_BASEURL`. The explicit
//! configuration always wins over the environment variable.

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg, FixedBackoff};
use crate::retry_policy::{RetryPolicy, RetryPolicyArg, RetryPolicyExt, TransientErrors};
use std::sync::Arc;
use std::time::Duration;

/// The environment variable used to select the target [Environment].
pub const ENVIRONMENT_VAR: &str = "STACKIT_ENV";

/// The STACKIT environment targeted by a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Prod,
    Qa,
    Dev,
}

impl Environment {
    /// Reads the environment from `STACKIT_ENV`, defaulting to [Environment::Prod].
    pub fn from_env() -> Result<Self, ParseEnvironmentError> {
        Self::from_lookup(env_lookup)
    }

    /// Like [from_env][Environment::from_env], with an injected lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ParseEnvironmentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ENVIRONMENT_VAR) {
            None => Ok(Self::default()),
            Some(v) if v.is_empty() => Ok(Self::default()),
            Some(v) => v.parse(),
        }
    }

    /// The DNS domain for the services in this environment.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Prod => "stackit.cloud",
            Self::Qa => "qa.stackit.cloud",
            Self::Dev => "dev.stackit.cloud",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Prod => "prod",
            Self::Qa => "qa",
            Self::Dev => "dev",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Environment {
    type Err = ParseEnvironmentError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prod" => Ok(Self::Prod),
            "qa" => Ok(Self::Qa),
            "dev" => Ok(Self::Dev),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

/// The value does not name a known [Environment].
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown environment `{0}`, expected one of `prod`, `qa`, or `dev`")]
pub struct ParseEnvironmentError(String);

/// Describes the endpoint of a logical service.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServiceEndpoint {
    name: &'static str,
    host: &'static str,
}

impl ServiceEndpoint {
    /// Creates a new endpoint.
    ///
    /// # Parameters
    /// * `name` - the service name, used to build the override variable.
    /// * `host` - the host prefix, e.g. `ske.api.eu01`.
    pub const fn new(name: &'static str, host: &'static str) -> Self {
        Self { name, host }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The environment variable that overrides the base URL.
    ///
    /// # Example
    /// ```
    /// # use stackit_core::config::ServiceEndpoint;
    /// let endpoint = ServiceEndpoint::new("resource-manager", "resource-manager.api");
    /// assert_eq!(endpoint.env_var(), "STACKIT_RESOURCE_MANAGER_BASEURL");
    /// ```
    pub fn env_var(&self) -> String {
        format!(
            "STACKIT_{}_BASEURL",
            self.name.to_ascii_uppercase().replace('-', "_")
        )
    }

    /// The compiled default base URL for `environment`.
    pub fn default_url(&self, environment: Environment) -> String {
        format!("https://{}.{}", self.host, environment.domain())
    }
}

/// Resolves the base URL for a service.
///
/// The resolution order is: the explicit value, then the
/// `STACKIT_<SERVICE>_BASEURL` variable (as returned by `lookup`), then the
/// compiled default for `environment`. Empty values are ignored. Any trailing
/// slash is removed.
///
/// # Example
/// ```
/// # use stackit_core::config::*;
/// let endpoint = ServiceEndpoint::new("ske", "ske.api.eu01");
/// let url = resolve_base_url(None, &endpoint, Environment::Qa, |_| None);
/// assert_eq!(url, "https://ske.api.eu01.qa.stackit.cloud");
/// let url = resolve_base_url(Some("http://localhost:8080/"), &endpoint, Environment::Qa, |_| None);
/// assert_eq!(url, "http://localhost:8080");
/// ```
pub fn resolve_base_url<F>(
    explicit: Option<&str>,
    endpoint: &ServiceEndpoint,
    environment: Environment,
    lookup: F,
) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let url = explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| lookup(&endpoint.env_var()).filter(|v| !v.is_empty()))
        .unwrap_or_else(|| endpoint.default_url(environment));
    url.trim_end_matches('/').to_string()
}

/// Looks up an environment variable, ignoring variables that are not unicode.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Configures the retry behavior of the transport.
///
/// By default the transport makes at most 3 attempts, waits 30 seconds
/// between attempts, and gives up after 2 minutes.
///
/// # Example
/// ```
/// # use stackit_core::config::RetryConfig;
/// use std::time::Duration;
/// let config = RetryConfig::default()
///     .with_max_retries(5)
///     .with_wait_between_calls(Duration::from_secs(1));
/// assert_eq!(config.max_retries(), 5);
/// ```
#[derive(Clone, Debug)]
pub struct RetryConfig {
    max_retries: u32,
    wait_between_calls: Duration,
    timeout: Duration,
    retry_policy: Option<RetryPolicyArg>,
    backoff_policy: Option<BackoffPolicyArg>,
}

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_WAIT_BETWEEN_CALLS: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(120);

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            wait_between_calls: DEFAULT_WAIT_BETWEEN_CALLS,
            timeout: DEFAULT_RETRY_TIMEOUT,
            retry_policy: None,
            backoff_policy: None,
        }
    }
}

impl RetryConfig {
    /// Sets the maximum number of attempts, including the initial attempt.
    pub fn with_max_retries(mut self, v: u32) -> Self {
        self.max_retries = v;
        self
    }

    /// Sets the delay between attempts.
    pub fn with_wait_between_calls(mut self, v: Duration) -> Self {
        self.wait_between_calls = v;
        self
    }

    /// Sets the wall-clock budget for all attempts of one request.
    pub fn with_timeout(mut self, v: Duration) -> Self {
        self.timeout = v;
        self
    }

    /// Replaces the retry policy.
    ///
    /// A custom policy ignores [max_retries][RetryConfig::max_retries].
    pub fn with_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.retry_policy = Some(v.into());
        self
    }

    /// Replaces the backoff policy.
    ///
    /// A custom policy ignores
    /// [wait_between_calls][RetryConfig::wait_between_calls].
    pub fn with_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = Some(v.into());
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn wait_between_calls(&self) -> Duration {
        self.wait_between_calls
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn retry_policy(&self) -> Arc<dyn RetryPolicy> {
        match &self.retry_policy {
            Some(p) => p.0.clone(),
            None => Arc::new(TransientErrors.with_attempt_limit(self.max_retries)),
        }
    }

    pub(crate) fn backoff_policy(&self) -> Arc<dyn BackoffPolicy> {
        match &self.backoff_policy {
            Some(p) => p.0.clone(),
            None => Arc::new(FixedBackoff::new(self.wait_between_calls)),
        }
    }
}
