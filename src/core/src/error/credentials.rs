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


use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// An error creating or refreshing an access token.
///
/// Loading a service account key may fail, and so may exchanging a signed
/// assertion or a refresh token at the token endpoint, long after the key was
/// loaded. Only the second kind can be transient.
///
/// # Example
/// ```
/// # use stackit_core::error::CredentialsError;
/// let err = CredentialsError::from_msg(true, "the token endpoint is unavailable");
/// assert!(err.is_transient());
/// assert!(err.to_string().contains("token endpoint is unavailable"));
/// ```
#[derive(Clone, Debug)]
pub struct CredentialsError {
    is_transient: bool,
    message: Option<String>,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl CredentialsError {
    /// Wraps `source`.
    pub fn new<T: Error + Send + Sync + 'static>(is_transient: bool, source: T) -> Self {
        Self {
            is_transient,
            message: None,
            source: Some(Arc::new(source)),
        }
    }

    /// Creates an error without a source.
    pub fn from_msg<T: Into<String>>(is_transient: bool, message: T) -> Self {
        Self {
            is_transient,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Returns `true` if a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        self.is_transient
    }
}

impl Error for CredentialsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|s| s.as_ref() as &(dyn Error + 'static))
    }
}

impl Display for CredentialsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let retry = if self.is_transient {
            "retrying may succeed"
        } else {
            "retrying will not succeed"
        };
        write!(f, "cannot obtain an access token ({retry})")?;
        if let Some(m) = &self.message {
            write!(f, ": {m}")?;
        }
        if let Some(s) = &self.source {
            write!(f, ": {s}")?;
        }
        Ok(())
    }
}
