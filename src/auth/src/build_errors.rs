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


//! Errors reported while building [Credentials][crate::credentials::Credentials].
//!
//! Builders fail fast. Missing key material, unreadable key files and
//! malformed keys are reported by `build()`, not by the first request.

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error returned by the credentials builders.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// A key or credentials file could not be read.
    pub fn is_read(&self) -> bool {
        matches!(self.0, ErrorKind::Read(_))
    }

    /// The key material or the configuration is malformed.
    pub fn is_invalid(&self) -> bool {
        matches!(self.0, ErrorKind::Invalid(_))
    }

    /// No credentials are configured.
    pub fn is_missing(&self) -> bool {
        matches!(self.0, ErrorKind::Missing(_))
    }

    pub(crate) fn read<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Read(source.into()))
    }

    pub(crate) fn invalid<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Invalid(source.into()))
    }

    pub(crate) fn missing(what: &'static str) -> Self {
        Self(ErrorKind::Missing(what))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("cannot read the key material: {0}")]
    Read(#[source] BoxError),
    #[error("invalid key material or configuration: {0}")]
    Invalid(#[source] BoxError),
    #[error("no {0} configured")]
    Missing(&'static str),
}

/// The result of a credentials builder.
pub type BuildResult<T> = std::result::Result<T, Error>;
