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


//! Wait helpers for STACKIT asynchronous operations.
//!
//! Many STACKIT operations return before the resource reaches its final
//! state. Creating a Kubernetes cluster, for example, returns as soon as the
//! request is accepted, while the cluster keeps reconciling for several
//! minutes. The types in this crate poll the resource until it reaches a
//! terminal state, the wait times out, or the caller cancels it.
//!
//! [AsyncActionHandler] implements the polling loop. The service specific
//! wait handlers in `stackit-services` build one from a predicate closure,
//! usually with the help of a [StatusPolicy].
//!
//! # Example
//! ```
//! # use stackit_wait::{AsyncActionHandler, PollingResult};
//! # use std::time::Duration;
//! # tokio_test::block_on(async {
//! let mut handler = AsyncActionHandler::new(|| async {
//!     Ok(PollingResult::Completed(Some("ACTIVE".to_string())))
//! });
//! handler.set_poll_interval(Duration::from_millis(10));
//! let state = handler.wait().await?;
//! assert_eq!(state.as_deref(), Some("ACTIVE"));
//! # stackit_core::Result::<()>::Ok(()) });
//! ```

pub use stackit_core::Result;
pub use stackit_core::error::Error;

mod handler;
pub use handler::{AsyncActionHandler, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, PollContext};

mod status;
pub use status::{NotFound, StatusPolicy};

/// The result of checking an asynchronous operation once.
///
/// # Parameters
/// * `T` - the resource type. This is the value returned when the operation
///   completes.
#[derive(Clone, Debug, PartialEq)]
pub enum PollingResult<T> {
    /// The operation is still in progress.
    InProgress,
    /// The operation completed.
    ///
    /// Operations that delete resources typically complete without a value.
    Completed(Option<T>),
}

impl<T> PollingResult<T> {
    /// Returns `true` if the operation completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
