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


//! STACKIT service clients and wait handlers.
//!
//! Each module in this crate covers one STACKIT service. A module contains:
//! - the resource types returned by the service,
//! - a `Getter` trait, used by the wait handlers to fetch the current state
//!   of a resource,
//! - a `Client` implementing the `Getter` trait and the operations that
//!   create, update or delete resources,
//! - a `wait` module with the handlers that poll a resource until the
//!   operation completes.
//!
//! # Example
//! ```no_run
//! # use stackit_services::resourcemanager::{Client, CreateProjectPayload};
//! # use stackit_services::resourcemanager::wait::create_project_wait_handler;
//! # use std::sync::Arc;
//! # tokio_test::block_on(async {
//! let client = Arc::new(Client::builder().build()?);
//! let payload = CreateProjectPayload::new("my-folder-id", "my-project");
//! let project = client.create_project(&payload).await?;
//! let container_id = project.container_id.unwrap_or_default();
//! let project = create_project_wait_handler(client, container_id).wait().await?;
//! println!("project is ready: {project:?}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub use stackit_core::Result;
pub use stackit_core::error::Error;

pub mod client;
pub mod dsa;
pub mod iaas;
pub mod loadbalancer;
pub mod objectstorage;
pub mod postgresflex;
pub mod resourcemanager;
pub mod ske;

/// Errors that may disappear if the wait handler keeps polling.
///
/// These are the errors the transport already retries: timeouts, broken
/// connections and gateway errors. Wait handlers tolerate them for the full
/// wait, not only for the transport retry budget.
pub(crate) fn is_transient(error: &Error) -> bool {
    error.is_transient()
}

/// Like [is_transient], also tolerating `403 Forbidden`.
///
/// Permissions on new resources propagate with some delay.
pub(crate) fn is_transient_or_forbidden(error: &Error) -> bool {
    is_transient(error) || error.http_status_code() == Some(403)
}
