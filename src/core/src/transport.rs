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

//! The HTTP transport with bounded retries.

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::config::RetryConfig;
use crate::error::Error;
use crate::response::HttpResponse;
use crate::retry_policy::RetryPolicy;
use http::{HeaderMap, Method};
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Sends HTTP requests, retrying transient failures.
///
/// The transport classifies failures into structured error kinds (timeouts,
/// connection problems, truncated responses) and consults the retry policy
/// for those and for `5xx` responses. Requests are retried after a fixed
/// delay until the policy is exhausted. All attempts share a single
/// wall-clock budget.
///
/// Once the policy stops the loop, the transport returns the last observed
/// result: a response (even if it is a `5xx` response), or an error. Errors
/// include the request method and URL.
///
/// # Example
/// ```no_run
/// # use stackit_core::{config::RetryConfig, transport::Transport};
/// # tokio_test::block_on(async {
/// let transport = Transport::new(RetryConfig::default());
/// let builder = transport.request(http::Method::GET, "https://example.com/v1/things");
/// let response = transport.execute(builder).await?;
/// println!("status = {}", response.status());
/// # stackit_core::Result::<()>::Ok(()) });
/// ```
#[derive(Clone, Debug)]
pub struct Transport {
    inner: reqwest::Client,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
    timeout: Duration,
}

impl Transport {
    /// Creates a transport with a new `reqwest::Client`.
    pub fn new(config: RetryConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a transport using an existing `reqwest::Client`.
    pub fn with_client(inner: reqwest::Client, config: RetryConfig) -> Self {
        Self {
            inner,
            retry_policy: config.retry_policy(),
            backoff_policy: config.backoff_policy(),
            timeout: config.timeout(),
        }
    }

    /// Starts a request builder using the underlying client.
    pub fn request<U: reqwest::IntoUrl>(&self, method: Method, url: U) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    /// Sends the request, retrying transient failures.
    pub async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<HttpResponse> {
        self.execute_with_headers(builder, || std::future::ready(Ok(HeaderMap::new())))
            .await
    }

    /// Sends the request, adding the headers returned by `headers` to each
    /// attempt.
    ///
    /// Errors returned by `headers` are presented to the retry policy like
    /// any other failed attempt.
    pub async fn execute_with_headers<H, HF>(
        &self,
        builder: reqwest::RequestBuilder,
        headers: H,
    ) -> Result<HttpResponse>
    where
        H: Fn() -> HF + Sync,
        HF: Future<Output = Result<HeaderMap>> + Send,
    {
        let request = builder.build().map_err(Error::ser)?;
        let method = request.method().clone();
        let url = request.url().to_string();
        let idempotent = method == Method::GET;

        let inner = || {
            let attempt = request.try_clone();
            let headers = headers();
            async move {
                let mut attempt = attempt
                    .ok_or_else(|| Error::ser("the request body cannot be sent more than once"))?;
                attempt.headers_mut().extend(headers.await?);
                self.request_attempt(attempt).await
            }
        };
        let attempts = crate::retry_loop_internal::retry_loop(
            inner,
            tokio::time::sleep,
            idempotent,
            self.retry_policy.clone(),
            self.backoff_policy.clone(),
        );
        match tokio::time::timeout(self.timeout, attempts).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(e.with_request(method, url)),
            Err(e) => Err(Error::timeout(e).with_request(method, url)),
        }
    }

    async fn request_attempt(&self, request: reqwest::Request) -> Result<HttpResponse> {
        let method = request.method().clone();
        let url = request.url().to_string();
        tracing::debug!(%method, %url, "sending request");
        let response = self
            .inner
            .execute(request)
            .await
            .map_err(Self::map_send_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Self::map_send_error)?;
        tracing::debug!(%method, %url, %status, "received response");
        Ok(HttpResponse::new(status, headers, body).with_request(method, url))
    }

    fn map_send_error(err: reqwest::Error) -> Error {
        if err.is_timeout() {
            return Error::timeout(err);
        }
        if err.is_connect() {
            return Error::connection(err);
        }
        match classify_source(&err) {
            Some(SourceKind::Connection) => Error::connection(err),
            Some(SourceKind::UnexpectedEof) => Error::unexpected_eof(err),
            Some(SourceKind::Timeout) => Error::timeout(err),
            None => Error::io(err),
        }
    }
}

#[derive(Debug, PartialEq)]
enum SourceKind {
    Connection,
    UnexpectedEof,
    Timeout,
}

// Walks the source chain looking for a well-known transport failure.
fn classify_source(err: &(dyn StdError + 'static)) -> Option<SourceKind> {
    use std::io::ErrorKind;
    let mut current = err.source();
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            match io.kind() {
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe => return Some(SourceKind::Connection),
                ErrorKind::UnexpectedEof => return Some(SourceKind::UnexpectedEof),
                ErrorKind::TimedOut => return Some(SourceKind::Timeout),
                _ => {}
            }
        }
        if let Some(h) = e.downcast_ref::<hyper::Error>() {
            if h.is_incomplete_message() {
                return Some(SourceKind::UnexpectedEof);
            }
            if h.is_timeout() {
                return Some(SourceKind::Timeout);
            }
        }
        current = e.source();
    }
    None
}
