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


//! Static service account tokens.
//!
//! A static token is a long-lived service account access token. It is used
//! as-is, the credentials never refresh it.

use crate::Result;
use crate::credentials::{Credentials, CredentialsProvider, build_bearer_headers};
use crate::token::Token;
use http::HeaderMap;

/// Creates [Credentials] that always return the same token.
///
/// # Example
/// ```
/// # use stackit_auth::credentials::static_token::Builder;
/// let credentials = Builder::new("my-token")
///     .with_email("my-sa@sa.stackit.cloud")
///     .build();
/// ```
#[derive(Debug)]
pub struct Builder {
    token: String,
    email: Option<String>,
}

impl Builder {
    pub fn new<V: Into<String>>(token: V) -> Self {
        Self {
            token: token.into(),
            email: None,
        }
    }

    /// Sets the service account email. It is informational only.
    pub fn with_email<V: Into<String>>(mut self, v: V) -> Self {
        self.email = Some(v.into());
        self
    }

    pub(crate) fn with_optional_email(mut self, v: Option<String>) -> Self {
        self.email = v;
        self
    }

    pub fn build(self) -> Credentials {
        Credentials::from(StaticToken {
            email: self.email,
            token: Token::bearer(self.token, None),
        })
    }
}

struct StaticToken {
    email: Option<String>,
    token: Token,
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("email", &self.email)
            .field("token", &self.token)
            .finish()
    }
}

#[async_trait::async_trait]
impl CredentialsProvider for StaticToken {
    async fn token(&self) -> Result<Token> {
        Ok(self.token.clone())
    }

    async fn headers(&self) -> Result<HeaderMap> {
        build_bearer_headers(&self.token)
    }
}
