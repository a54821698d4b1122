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


//! STACKIT Client Libraries for Rust - Authentication Components
//!
//! This crate contains types and functions used to authenticate applications
//! calling STACKIT services. The service clients consume
//! [credentials::Credentials] and use them to add an `Authorization` header
//! to every request issued by the application.
//!
//! Two flows are supported:
//!
//! * [Static tokens], where a long-lived service account token is used as-is.
//! * The [key flow], where a service account key signs a short-lived JWT
//!   assertion. The assertion is exchanged for an access token and a refresh
//!   token. Later refreshes use the refresh token while it remains valid.
//!
//! Most applications should use [credentials::Builder], which selects a flow
//! from explicit configuration, environment variables, or the credentials
//! file.
//!
//! [Static tokens]: credentials::static_token
//! [key flow]: credentials::key_flow

pub mod build_errors;
pub(crate) mod constants;
pub mod credentials;
pub mod errors;
pub(crate) mod jwt;
pub mod token;
pub mod transport;

/// A `Result` alias where the `Err` case is
/// `stackit_core::error::CredentialsError`.
pub(crate) type Result<T> = std::result::Result<T, crate::errors::CredentialsError>;
