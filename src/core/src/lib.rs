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

//! STACKIT client library helpers.
//!
//! This crate contains the types and functions shared by the STACKIT client
//! libraries for Rust: the error types, the client configuration, the retry
//! and backoff policies, and the HTTP transport that implements them.
//!
//! Applications rarely need to use this crate directly, with the exception of
//! the [error] module and the [config::RetryConfig] type.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions wrapping requests.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

pub mod backoff_policy;
pub mod config;
pub mod error;
pub mod response;
pub mod retry_policy;
pub mod retry_result;
pub mod transport;

mod retry_loop_internal;
