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


//! The access tokens returned by [Credentials][crate::credentials::Credentials].

use tokio::time::Instant;

/// An access token for the STACKIT APIs.
///
/// The `Debug` output never includes the token value.
#[derive(Clone, PartialEq)]
pub struct Token {
    /// The value sent in the `Authorization:` header.
    pub token: String,

    /// Usually `"Bearer"`.
    pub token_type: String,

    /// When the token expires, if the token endpoint reported it.
    ///
    /// Informational only. The key flow decides when to refresh by inspecting
    /// the token itself.
    pub expires_at: Option<Instant>,
}

impl Token {
    pub(crate) fn bearer<T: Into<String>>(token: T, expires_at: Option<Instant>) -> Self {
        Self {
            token: token.into(),
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token", &"[censored]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
