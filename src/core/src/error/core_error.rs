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

use super::CredentialsError;
use http::{HeaderMap, Method};
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by all client libraries.
///
/// The client libraries report errors from multiple sources. The transport
/// may be unable to connect to the service, the request may time out, the
/// service may reject the request, the credentials may be misconfigured, or a
/// wait operation may expire before the resource reaches a terminal state.
///
/// Most applications will just return the error or log it. Applications that
/// need to react to specific conditions can use the predicates in this type,
/// which classify errors by kind. There is no need to match on the error
/// message.
///
/// # Example
/// ```
/// use stackit_core::error::Error;
/// match example_function() {
///     Err(e) if e.is_not_found() => { println!("already gone {e}"); },
///     Err(e) if e.is_timeout() => { println!("not enough time {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # Err(Error::http(404, http::HeaderMap::new(), bytes::Bytes::from_static(b"NOT FOUND")))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    request: Option<RequestContext>,
    source: Option<BoxError>,
}

/// The HTTP method and URL of the request associated with an error.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestContext {
    pub method: Method,
    pub url: String,
}

impl Error {
    fn new<T: Into<BoxError>>(kind: ErrorKind, source: T) -> Self {
        Self {
            kind,
            request: None,
            source: Some(source.into()),
        }
    }

    /// Creates an error representing invalid or missing configuration.
    ///
    /// # Example
    /// ```
    /// use stackit_core::error::Error;
    /// let error = Error::configuration("missing base URL");
    /// assert!(error.is_configuration());
    /// ```
    pub fn configuration<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Configuration, source)
    }

    /// The client configuration is invalid.
    ///
    /// This is always a client-side generated error and it is never transient.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration)
    }

    /// Creates an error representing a serialization problem.
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Serialization, source)
    }

    /// The request could not be serialized.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// Creates an error representing a deserialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use stackit_core::error::Error;
    /// let error = Error::deser("simulated problem");
    /// assert!(error.is_deserialization());
    /// assert!(error.source().is_some());
    /// ```
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Deserialization, source)
    }

    /// The response could not be deserialized.
    ///
    /// This includes responses where a payload, or a field in the payload, was
    /// expected but is missing. Such errors are never retried.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Cannot create the authentication headers.
    pub fn authentication(source: CredentialsError) -> Self {
        Self::new(ErrorKind::Authentication, source)
    }

    /// Could not create the authentication headers before sending the request.
    ///
    /// # Troubleshooting
    ///
    /// Typically this indicates a misconfigured authentication environment,
    /// such as a missing or malformed service account key, or a private key
    /// that does not match the service account key. It may also indicate that
    /// the token endpoint rejected the assertion or the refresh token.
    pub fn is_authentication(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication)
    }

    /// Creates an error representing a timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use stackit_core::error::Error;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Timeout, source)
    }

    /// The request could not be completed before its deadline.
    ///
    /// This is always a client-side generated error. Note that the request may
    /// or may not have started, and it may or may not complete in the service.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Creates an error representing a refused or reset connection.
    pub fn connection<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Connection, source)
    }

    /// The transport could not connect, or the connection was reset.
    pub fn is_connection(&self) -> bool {
        matches!(self.kind, ErrorKind::Connection)
    }

    /// Creates an error representing a connection closed mid-response.
    pub fn unexpected_eof<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::UnexpectedEof, source)
    }

    /// The connection was closed before the full response was received.
    ///
    /// The service may have processed the request. Only requests that are
    /// safe to repeat, such as `GET`, are retried on this error.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedEof)
    }

    /// A problem in the transport layer without a full HTTP response.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Io, source)
    }

    /// The transport failed for reasons other than a timeout, a connection
    /// problem, or a truncated response.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }

    /// An error response received from the service.
    ///
    /// # Example
    /// ```
    /// use stackit_core::error::Error;
    /// let error = Error::http(502, http::HeaderMap::new(), bytes::Bytes::from_static(b"bad gateway"));
    /// assert_eq!(error.http_status_code(), Some(502));
    /// assert!(error.is_transient());
    /// ```
    pub fn http(status_code: u16, headers: HeaderMap, payload: bytes::Bytes) -> Self {
        let details = HttpDetails {
            status_code,
            headers,
            payload,
        };
        Self {
            kind: ErrorKind::Http(Box::new(details)),
            request: None,
            source: None,
        }
    }

    /// The service returned an error response.
    pub fn is_http(&self) -> bool {
        matches!(self.kind, ErrorKind::Http(_))
    }

    /// Creates the error returned when a wait operation exceeds its deadline.
    pub fn wait_timeout<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::WaitTimeout, source)
    }

    /// The wait operation did not observe a terminal state before its
    /// deadline.
    ///
    /// # Troubleshooting
    ///
    /// Some resources, such as Kubernetes clusters or database instances, can
    /// take a long time to provision. Consider increasing the timeout of the
    /// wait handler. The operation continues in the service, a new wait
    /// operation may still observe its completion.
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::WaitTimeout)
    }

    /// Creates the error returned when a wait operation is cancelled.
    pub fn cancelled<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Cancelled, source)
    }

    /// The application cancelled the wait operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Creates an error for a resource that reached a failure state.
    ///
    /// # Example
    /// ```
    /// use stackit_core::error::Error;
    /// let error = Error::operation_failed("received status FAILED from server");
    /// assert!(error.is_operation_failed());
    /// assert!(error.to_string().contains("FAILED"));
    /// ```
    pub fn operation_failed<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::OperationFailed, source)
    }

    /// The service reports the awaited resource in a terminal failure state.
    pub fn is_operation_failed(&self) -> bool {
        matches!(self.kind, ErrorKind::OperationFailed)
    }

    /// An uncategorized error.
    pub fn other<T: Into<BoxError>>(source: T) -> Self {
        Self::new(ErrorKind::Other, source)
    }

    /// Returns `true` if the service reports that the resource does not exist.
    ///
    /// Both `404 Not Found` and `410 Gone` count as not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self.http_status_code(), Some(404) | Some(410))
    }

    /// Returns `true` for errors that may disappear on a future attempt.
    ///
    /// These are timeouts, connection problems, truncated responses, and the
    /// `500`, `502`, `503`, and `504` status codes.
    pub fn is_transient(&self) -> bool {
        match &self.kind {
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::UnexpectedEof => true,
            ErrorKind::Http(d) => matches!(d.status_code, 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// The HTTP status code, if any, associated with this error.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http(d) => Some(d.status_code),
            _ => None,
        }
    }

    /// The headers, if any, associated with this error.
    pub fn http_headers(&self) -> Option<&HeaderMap> {
        match &self.kind {
            ErrorKind::Http(d) => Some(&d.headers),
            _ => None,
        }
    }

    /// The payload, if any, associated with this error.
    ///
    /// STACKIT services typically return a JSON object with a `message`
    /// field. The payload is returned unparsed.
    pub fn http_payload(&self) -> Option<&bytes::Bytes> {
        match &self.kind {
            ErrorKind::Http(d) => Some(&d.payload),
            _ => None,
        }
    }

    /// The request that produced this error, if known.
    pub fn request(&self) -> Option<&RequestContext> {
        self.request.as_ref()
    }

    /// Attaches the method and URL of the failed request.
    pub fn with_request<U: Into<String>>(mut self, method: Method, url: U) -> Self {
        self.request = Some(RequestContext {
            method,
            url: url.into(),
        });
        self
    }

    /// Returns `true` if the source is a transient [CredentialsError].
    pub(crate) fn is_transient_credentials_error(&self) -> bool {
        if !matches!(&self.kind, ErrorKind::Authentication) {
            return false;
        }
        self.source
            .as_ref()
            .and_then(|e| e.downcast_ref::<CredentialsError>())
            .map(|e| e.is_transient())
            .unwrap_or(false)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Configuration, Some(e)) => {
                write!(f, "the client configuration is invalid: {e}")
            }
            (ErrorKind::Serialization, Some(e)) => write!(f, "cannot serialize the request {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response {e}")
            }
            (ErrorKind::Authentication, Some(e)) => {
                write!(f, "cannot create the authentication headers {e}")
            }
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the request deadline {e}")
            }
            (ErrorKind::Connection, Some(e)) => {
                write!(f, "cannot connect to the service {e}")
            }
            (ErrorKind::UnexpectedEof, Some(e)) => {
                write!(f, "the connection closed before the response completed {e}")
            }
            (ErrorKind::Io, Some(e)) => write!(f, "the transport reports an error: {e}"),
            (ErrorKind::Http(d), _) => d.display(f),
            (ErrorKind::WaitTimeout, Some(e)) => {
                write!(f, "the wait operation exceeded its deadline {e}")
            }
            (ErrorKind::Cancelled, Some(e)) => write!(f, "the wait operation was cancelled {e}"),
            (ErrorKind::OperationFailed, Some(e)) => {
                write!(f, "the resource reached a failure state: {e}")
            }
            (ErrorKind::Other, Some(e)) => {
                write!(f, "an unclassified problem making a request: {e}")
            }
            (_, None) => unreachable!("no constructor allows this"),
        }?;
        if let Some(r) = &self.request {
            write!(f, " ({} {})", r.method, r.url)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Configuration,
    Serialization,
    Deserialization,
    Authentication,
    Timeout,
    Connection,
    UnexpectedEof,
    Io,
    Http(Box<HttpDetails>),
    WaitTimeout,
    Cancelled,
    OperationFailed,
    /// A uncategorized error.
    Other,
}

#[derive(Debug)]
struct HttpDetails {
    status_code: u16,
    headers: HeaderMap,
    payload: bytes::Bytes,
}

impl HttpDetails {
    fn display(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.status_code;
        match std::str::from_utf8(self.payload.as_ref()) {
            Ok(message) => write!(f, "the HTTP transport reports a [{code}] error: {message}"),
            Err(_) => write!(
                f,
                "the HTTP transport reports a [{code}] error: {:?}",
                self.payload
            ),
        }
    }
}
