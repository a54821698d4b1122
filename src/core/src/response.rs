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

//! Responses received by the transport.

use crate::Result;
use crate::error::{Error, RequestContext};
use http::{HeaderMap, Method, StatusCode};

/// A fully received HTTP response.
///
/// The transport reads the complete body before returning, so the response
/// can be inspected and decoded more than once. Decoding happens by status
/// code: successful responses decode into the expected payload, all other
/// responses become an [Error] with the status code, headers, and payload.
///
/// # Example
/// ```
/// # use stackit_core::response::HttpResponse;
/// #[derive(serde::Deserialize)]
/// struct Project { status: Option<String> }
///
/// let response = HttpResponse::new(
///     http::StatusCode::OK,
///     http::HeaderMap::new(),
///     bytes::Bytes::from_static(br#"{"status": "ACTIVE"}"#));
/// let project = response.into_result::<Project>()?;
/// assert_eq!(project.status.as_deref(), Some("ACTIVE"));
/// # Ok::<(), stackit_core::error::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: bytes::Bytes,
    request: Option<RequestContext>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: bytes::Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            request: None,
        }
    }

    /// Records the request that produced this response.
    pub fn with_request<U: Into<String>>(mut self, method: Method, url: U) -> Self {
        self.request = Some(RequestContext {
            method,
            url: url.into(),
        });
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &bytes::Bytes {
        &self.body
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Converts the response into an [Error], regardless of its status code.
    pub fn to_error(&self) -> Error {
        let error = Error::http(
            self.status.as_u16(),
            self.headers.clone(),
            self.body.clone(),
        );
        self.attach(error)
    }

    /// Decodes the response by status code.
    ///
    /// Successful responses must contain a JSON payload. An empty body is a
    /// deserialization error, as the caller expected a payload.
    pub fn into_result<T>(self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if !self.is_success() {
            return Err(self.to_error());
        }
        if self.body.is_empty() {
            return Err(self.attach(Error::deser(
                "the response body is empty, expected a JSON payload",
            )));
        }
        serde_json::from_slice::<T>(&self.body).map_err(|e| self.attach(Error::deser(e)))
    }

    /// Discards the payload of successful responses.
    pub fn into_empty(self) -> Result<()> {
        if !self.is_success() {
            return Err(self.to_error());
        }
        Ok(())
    }

    fn attach(&self, error: Error) -> Error {
        match &self.request {
            None => error,
            Some(r) => error.with_request(r.method.clone(), r.url.clone()),
        }
    }
}
