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


//! Types and functions to work with STACKIT credentials.
//!
//! [Credentials] produce the `Authorization` header attached to every request
//! sent to a STACKIT service. Use [Builder] to select a flow from explicit
//! configuration, environment variables, or the credentials file:
//!
//! 1. An explicit token, see [Builder::with_token].
//! 2. Explicit key material, see [Builder::with_service_account_key].
//! 3. The `STACKIT_SERVICE_ACCOUNT_TOKEN` environment variable.
//! 4. Key material in `STACKIT_SERVICE_ACCOUNT_KEY`,
//!    `STACKIT_SERVICE_ACCOUNT_KEY_PATH`, `STACKIT_PRIVATE_KEY`, or
//!    `STACKIT_PRIVATE_KEY_PATH`.
//! 5. The credentials file at `STACKIT_CREDENTIALS_PATH`, or
//!    `~/.stackit/credentials.json` when the variable is not set.

pub mod key_flow;
pub mod static_token;

use crate::Result;
use crate::build_errors::{BuildResult, Error as BuildError};
use crate::constants::*;
use crate::errors;
use crate::token::Token;
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use stackit_core::config::{Environment, RetryConfig, env_lookup};
use std::path::PathBuf;
use std::sync::Arc;

/// An implementation of [CredentialsProvider].
///
/// Represents a [Credentials] used to obtain auth request headers.
///
/// This is a cheap-to-clone handle, clones share the same cached tokens.
///
/// # Example
/// ```
/// # use stackit_auth::credentials::static_token;
/// # tokio_test::block_on(async {
/// let credentials = static_token::Builder::new("my-token").build();
/// let headers = credentials.headers().await?;
/// assert_eq!(headers["authorization"], "Bearer my-token");
/// # Ok::<(), stackit_auth::errors::CredentialsError>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct Credentials {
    inner: Arc<dyn CredentialsProvider>,
}

impl<T> std::convert::From<T> for Credentials
where
    T: CredentialsProvider + 'static,
{
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl Credentials {
    /// Returns a valid access token, creating or refreshing it if needed.
    pub async fn token(&self) -> Result<Token> {
        self.inner.token().await
    }

    /// Returns the headers used to authenticate a request.
    pub async fn headers(&self) -> Result<HeaderMap> {
        self.inner.headers().await
    }

    /// Discards the cached access token.
    ///
    /// The next call to [token][Credentials::token] or
    /// [headers][Credentials::headers] creates a new access token.
    pub async fn invalidate(&self) {
        self.inner.invalidate().await
    }
}

/// Represents a credentials flow.
///
/// Applications rarely implement this trait, the exception are tests that
/// need to mock the credentials used by a service client.
#[async_trait::async_trait]
pub trait CredentialsProvider: std::fmt::Debug + Send + Sync {
    /// Returns a valid access token.
    async fn token(&self) -> Result<Token>;

    /// Returns the headers used to authenticate a request.
    async fn headers(&self) -> Result<HeaderMap>;

    /// Discards any cached access token. The default implementation does
    /// nothing.
    async fn invalidate(&self) {}
}

pub(crate) fn build_bearer_headers(token: &Token) -> Result<HeaderMap> {
    let mut value = HeaderValue::from_str(&format!("{} {}", token.token_type, token.token))
        .map_err(errors::non_retryable)?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Selects and builds [Credentials].
///
/// # Example
/// ```no_run
/// # use stackit_auth::credentials::Builder;
/// let credentials = Builder::default()
///     .with_service_account_key_path("/path/to/sa-key.json")
///     .build()?;
/// # Ok::<(), stackit_auth::build_errors::Error>(())
/// ```
#[derive(Default)]
pub struct Builder {
    token: Option<String>,
    email: Option<String>,
    key_flow: key_flow::Builder,
    credentials_path: Option<PathBuf>,
}

impl Builder {
    /// Uses a static service account token.
    pub fn with_token<V: Into<String>>(mut self, v: V) -> Self {
        self.token = Some(v.into());
        self
    }

    /// Sets the service account email used with a static token.
    pub fn with_service_account_email<V: Into<String>>(mut self, v: V) -> Self {
        self.email = Some(v.into());
        self
    }

    /// Sets the contents of the service account key JSON.
    pub fn with_service_account_key<V: Into<String>>(mut self, v: V) -> Self {
        self.key_flow = self.key_flow.with_service_account_key(v);
        self
    }

    /// Sets the path of the service account key JSON.
    pub fn with_service_account_key_path<V: Into<PathBuf>>(mut self, v: V) -> Self {
        self.key_flow = self.key_flow.with_service_account_key_path(v);
        self
    }

    /// Sets the PEM encoded RSA private key.
    pub fn with_private_key<V: Into<String>>(mut self, v: V) -> Self {
        self.key_flow = self.key_flow.with_private_key(v);
        self
    }

    /// Sets the path of the PEM encoded RSA private key.
    pub fn with_private_key_path<V: Into<PathBuf>>(mut self, v: V) -> Self {
        self.key_flow = self.key_flow.with_private_key_path(v);
        self
    }

    /// Overrides the token endpoint used by the key flow.
    pub fn with_token_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.key_flow = self.key_flow.with_token_endpoint(v);
        self
    }

    /// Sets the target environment used by the key flow.
    pub fn with_environment(mut self, v: Environment) -> Self {
        self.key_flow = self.key_flow.with_environment(v);
        self
    }

    /// Sets the retry configuration for requests to the token endpoint.
    pub fn with_retry_config(mut self, v: RetryConfig) -> Self {
        self.key_flow = self.key_flow.with_retry_config(v);
        self
    }

    /// Overrides the location of the credentials file.
    pub fn with_credentials_path<V: Into<PathBuf>>(mut self, v: V) -> Self {
        self.credentials_path = Some(v.into());
        self
    }

    /// Returns a [Credentials] instance for the first configured flow.
    ///
    /// # Errors
    ///
    /// Returns an error if no flow is configured, if a key or credentials
    /// file cannot be read, or if the key material is malformed.
    pub fn build(self) -> BuildResult<Credentials> {
        let email = self
            .email
            .clone()
            .or_else(|| non_empty_var(SERVICE_ACCOUNT_EMAIL_VAR));
        if let Some(token) = self.token.filter(|t| !t.is_empty()) {
            tracing::debug!("using an explicit service account token");
            return Ok(static_token::Builder::new(token)
                .with_optional_email(email)
                .build());
        }
        if self.key_flow.has_explicit_key() {
            tracing::debug!("using the key flow with explicit key material");
            return self.key_flow.build();
        }
        if let Some(token) = non_empty_var(SERVICE_ACCOUNT_TOKEN_VAR) {
            tracing::debug!("using the service account token from the environment");
            return Ok(static_token::Builder::new(token)
                .with_optional_email(email)
                .build());
        }
        if key_flow::Builder::has_environment_key() {
            tracing::debug!("using the key flow with key material from the environment");
            return self.key_flow.build();
        }
        from_credentials_file(self.credentials_path, self.key_flow, email)
    }
}

/// The contents of the credentials file.
#[derive(Debug, Default, serde::Deserialize)]
struct CredentialsFile {
    #[serde(rename = "STACKIT_SERVICE_ACCOUNT_TOKEN")]
    token: Option<String>,
    #[serde(rename = "STACKIT_SERVICE_ACCOUNT_EMAIL")]
    email: Option<String>,
    #[serde(rename = "STACKIT_SERVICE_ACCOUNT_KEY_PATH")]
    service_account_key_path: Option<PathBuf>,
    #[serde(rename = "STACKIT_PRIVATE_KEY_PATH")]
    private_key_path: Option<PathBuf>,
}

fn from_credentials_file(
    explicit: Option<PathBuf>,
    key_flow: key_flow::Builder,
    email: Option<String>,
) -> BuildResult<Credentials> {
    let configured = explicit.or_else(|| non_empty_var(CREDENTIALS_PATH_VAR).map(PathBuf::from));
    let (path, required) = match configured {
        Some(p) => (p, true),
        None => match default_credentials_path() {
            Some(p) => (p, false),
            None => return Err(BuildError::missing("service account token or key")),
        },
    };
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildError::missing("service account token or key"));
        }
        Err(e) => return Err(BuildError::read(format!("{}: {e}", path.display()))),
    };
    let file = serde_json::from_str::<CredentialsFile>(&contents).map_err(BuildError::invalid)?;
    if let Some(token) = file.token.filter(|t| !t.is_empty()) {
        tracing::debug!(path = %path.display(), "using the service account token from the credentials file");
        return Ok(static_token::Builder::new(token)
            .with_optional_email(email.or(file.email))
            .build());
    }
    let Some(key_path) = file.service_account_key_path else {
        return Err(BuildError::missing("service account token or key"));
    };
    tracing::debug!(path = %path.display(), "using the key flow with key files from the credentials file");
    let mut key_flow = key_flow.with_service_account_key_path(key_path);
    if let Some(p) = file.private_key_path {
        key_flow = key_flow.with_private_key_path(p);
    }
    key_flow.build()
}

fn default_credentials_path() -> Option<PathBuf> {
    let home = non_empty_var("HOME").or_else(|| non_empty_var("USERPROFILE"))?;
    Some(PathBuf::from(home).join(DEFAULT_CREDENTIALS_PATH))
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env_lookup(name).filter(|v| !v.is_empty())
}
