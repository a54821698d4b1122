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


//! Sends authenticated requests.

use crate::credentials::Credentials;
use http::{Method, StatusCode};
use stackit_core::Result;
use stackit_core::config::RetryConfig;
use stackit_core::error::Error;
use stackit_core::response::HttpResponse;
use stackit_core::transport::Transport;

/// A [Transport] that authenticates every request.
///
/// Each attempt in the retry loop of [Transport] obtains the `Authorization`
/// header from the credentials, creating or refreshing the access token as
/// needed. Credential failures become authentication errors, transient
/// ones are retried.
///
/// If the service rejects a request with `401 Unauthorized` the cached access
/// token is discarded and the request is sent once more with a new token.
///
/// # Example
/// ```no_run
/// # use stackit_auth::credentials::Builder;
/// # use stackit_auth::transport::AuthorizedTransport;
/// # use stackit_core::config::RetryConfig;
/// # tokio_test::block_on(async {
/// let credentials = Builder::default().build()?;
/// let transport = AuthorizedTransport::new(credentials, RetryConfig::default());
/// let builder = transport.request(http::Method::GET, "https://resource-manager.api.stackit.cloud/v2/projects/my-project");
/// let response = transport.execute(builder).await?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct AuthorizedTransport {
    credentials: Credentials,
    transport: Transport,
}

impl AuthorizedTransport {
    pub fn new(credentials: Credentials, config: RetryConfig) -> Self {
        Self::with_transport(credentials, Transport::new(config))
    }

    pub fn with_transport(credentials: Credentials, transport: Transport) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Starts a request builder.
    pub fn request<U: reqwest::IntoUrl>(&self, method: Method, url: U) -> reqwest::RequestBuilder {
        self.transport.request(method, url)
    }

    /// Sends the request with the credential headers.
    pub async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<HttpResponse> {
        let retry = builder.try_clone();
        let response = self.send(builder).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(retry) = retry else {
            return Ok(response);
        };
        tracing::debug!("the request was rejected with 401, retrying with a new access token");
        self.credentials.invalidate().await;
        self.send(retry).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<HttpResponse> {
        let credentials = &self.credentials;
        self.transport
            .execute_with_headers(builder, || async move {
                credentials.headers().await.map_err(Error::authentication)
            })
            .await
    }
}
