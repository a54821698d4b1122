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


//! Configure and create service clients.
//!
//! All the clients in this crate are created with a [ClientBuilder]. The
//! builder resolves the service endpoint, the target environment and the
//! credentials. Applications only need to change these defaults to use a
//! private endpoint, to target a non-production environment, or to provide
//! credentials explicitly.

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use stackit_auth::credentials::{Builder as CredentialsBuilder, Credentials};
use stackit_auth::transport::AuthorizedTransport;
use stackit_core::Result;
use stackit_core::config::{Environment, RetryConfig, ServiceEndpoint, env_lookup, resolve_base_url};
use std::marker::PhantomData;

/// The result of [ClientBuilder::build].
pub type BuildResult<T> = std::result::Result<T, Error>;

/// Indicates a problem while creating a client.
///
/// # Example
/// ```
/// # use stackit_services::client::Error;
/// # use stackit_services::resourcemanager::Client;
/// let result = Client::builder().build();
/// if let Err(e) = result {
///     if e.is_credentials() {
///         println!("cannot find credentials: {e}");
///     }
/// }
/// ```
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// The credentials could not be created.
    pub fn is_credentials(&self) -> bool {
        matches!(&self.0, ErrorKind::Credentials(_))
    }

    /// The client configuration is invalid, for example, `STACKIT_ENV` has an
    /// unknown value.
    pub fn is_configuration(&self) -> bool {
        matches!(&self.0, ErrorKind::Configuration(_))
    }

    fn credentials<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Credentials(source.into()))
    }

    fn configuration<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Configuration(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("could not create credentials")]
    Credentials(#[source] BoxError),
    #[error("invalid client configuration")]
    Configuration(#[source] BoxError),
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Implemented by the clients in this crate.
///
/// This is an implementation detail of the clients. Applications should have
/// no need to implement or use this trait.
#[doc(hidden)]
pub trait ServiceClient: Sized {
    /// The endpoint used when no override is configured.
    const ENDPOINT: ServiceEndpoint;

    fn from_rest(rest: RestClient) -> Self;
}

/// A builder for service clients.
///
/// # Example
/// ```
/// # use stackit_services::resourcemanager::Client;
/// # use stackit_auth::credentials::static_token;
/// use stackit_core::config::Environment;
/// let client = Client::builder()
///     .with_environment(Environment::Qa)
///     .with_credentials(static_token::Builder::new("my-token").build())
///     .build()?;
/// # Ok::<(), stackit_services::client::Error>(())
/// ```
pub struct ClientBuilder<C> {
    endpoint: Option<String>,
    environment: Option<Environment>,
    credentials: Option<Credentials>,
    retry: RetryConfig,
    client: PhantomData<fn() -> C>,
}

impl<C> std::fmt::Debug for ClientBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("endpoint", &self.endpoint)
            .field("environment", &self.environment)
            .field("credentials", &self.credentials)
            .field("retry", &self.retry)
            .finish()
    }
}

impl<C> Default for ClientBuilder<C> {
    fn default() -> Self {
        Self {
            endpoint: None,
            environment: None,
            credentials: None,
            retry: RetryConfig::default(),
            client: PhantomData,
        }
    }
}

impl<C: ServiceClient> ClientBuilder<C> {
    /// Creates the client.
    ///
    /// The environment defaults to the value of `STACKIT_ENV`, or production
    /// if the variable is not set. The endpoint is resolved from the explicit
    /// value, then the `STACKIT_<SERVICE>_BASEURL` variable, then the
    /// default for the environment. Without explicit credentials the client
    /// uses [stackit_auth::credentials::Builder] to find them.
    pub fn build(self) -> BuildResult<C> {
        let environment = match self.environment {
            Some(e) => e,
            None => Environment::from_env().map_err(Error::configuration)?,
        };
        let credentials = match self.credentials {
            Some(c) => c,
            None => CredentialsBuilder::default()
                .with_environment(environment)
                .with_retry_config(self.retry.clone())
                .build()
                .map_err(Error::credentials)?,
        };
        let base_url = resolve_base_url(
            self.endpoint.as_deref(),
            &C::ENDPOINT,
            environment,
            env_lookup,
        );
        tracing::debug!(service = C::ENDPOINT.name(), base_url = %base_url, "creating client");
        let transport = AuthorizedTransport::new(credentials, self.retry);
        Ok(C::from_rest(RestClient::new(base_url, transport)))
    }

    /// Sets the endpoint, for example, to use a private endpoint or a test
    /// server.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Sets the target environment.
    pub fn with_environment(mut self, v: Environment) -> Self {
        self.environment = Some(v);
        self
    }

    /// Configures the authentication credentials.
    pub fn with_credentials<T: Into<Credentials>>(mut self, v: T) -> Self {
        self.credentials = Some(v.into());
        self
    }

    /// Configures the retry behavior for requests made by this client.
    pub fn with_retry_config(mut self, v: RetryConfig) -> Self {
        self.retry = v;
        self
    }
}

/// Sends JSON requests to a service and decodes the responses.
#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct RestClient {
    base_url: String,
    transport: AuthorizedTransport,
}

impl RestClient {
    pub(crate) fn new(base_url: String, transport: AuthorizedTransport) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, Option::<&()>::None)
            .await?
            .into_result()
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await?.into_result()
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await?.into_result()
    }

    pub(crate) async fn patch<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, path, Some(body)).await?.into_empty()
    }

    pub(crate) async fn post_empty<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body)).await?.into_empty()
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, Option::<&()>::None)
            .await?
            .into_empty()
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<stackit_core::response::HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url());
        let builder = self.transport.request(method, url);
        let builder = match body {
            None => builder,
            Some(b) => builder.json(b),
        };
        self.transport.execute(builder).await
    }
}

/// Validates a value used to build a request path.
///
/// Identifiers are opaque to the client, but they cannot be empty or
/// introduce new path segments.
pub(crate) fn path_parameter<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(stackit_core::error::Error::configuration(format!(
            "missing required parameter {name}"
        )));
    }
    if value.contains(['/', '?', '#']) {
        return Err(stackit_core::error::Error::configuration(format!(
            "invalid value for parameter {name}: {value}"
        )));
    }
    Ok(value)
}
