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


/// JWT bearer OAuth grant type, used to exchange a signed assertion.
pub(crate) const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Refresh token OAuth grant type.
pub(crate) const REFRESH_TOKEN_GRANT_TYPE: &str = "refresh_token";

pub(crate) const SERVICE_ACCOUNT_TOKEN_VAR: &str = "STACKIT_SERVICE_ACCOUNT_TOKEN";
pub(crate) const SERVICE_ACCOUNT_EMAIL_VAR: &str = "STACKIT_SERVICE_ACCOUNT_EMAIL";
pub(crate) const SERVICE_ACCOUNT_KEY_VAR: &str = "STACKIT_SERVICE_ACCOUNT_KEY";
pub(crate) const SERVICE_ACCOUNT_KEY_PATH_VAR: &str = "STACKIT_SERVICE_ACCOUNT_KEY_PATH";
pub(crate) const PRIVATE_KEY_VAR: &str = "STACKIT_PRIVATE_KEY";
pub(crate) const PRIVATE_KEY_PATH_VAR: &str = "STACKIT_PRIVATE_KEY_PATH";
pub(crate) const TOKEN_BASE_URL_VAR: &str = "STACKIT_TOKEN_BASEURL";
pub(crate) const CREDENTIALS_PATH_VAR: &str = "STACKIT_CREDENTIALS_PATH";

/// Relative to the home directory.
pub(crate) const DEFAULT_CREDENTIALS_PATH: &str = ".stackit/credentials.json";
