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


//! Wait handlers for Resource Manager operations.

use super::{Project, ProjectGetter};
use crate::is_transient_or_forbidden;
use stackit_wait::{AsyncActionHandler, NotFound, PollingResult, StatusPolicy};
use std::sync::Arc;
use std::time::Duration;

/// Waits until a new project is `ACTIVE`.
///
/// New projects may briefly return `404 Not Found` or `403 Forbidden` while
/// the project and its permissions propagate. The handler keeps polling in
/// both cases.
pub fn create_project_wait_handler<G>(
    client: Arc<G>,
    container_id: impl Into<String>,
) -> AsyncActionHandler<Project>
where
    G: ProjectGetter + ?Sized + 'static,
{
    let container_id = container_id.into();
    let policy = StatusPolicy::new("project")
        .with_success(&["ACTIVE"])
        .with_failure(&["DELETING", "INACTIVE"])
        .with_in_progress(&["CREATING"])
        .with_not_found(NotFound::Continue)
        .with_transient(is_transient_or_forbidden);
    let mut handler = AsyncActionHandler::new(move || {
        let client = client.clone();
        let container_id = container_id.clone();
        let policy = policy.clone();
        async move {
            let fetched = client.get_project(&container_id).await;
            policy.evaluate(fetched, |p| p.lifecycle_state.as_deref())
        }
    });
    handler.set_timeout(Duration::from_secs(45 * 60));
    handler
}

/// Waits until a project is deleted.
///
/// The project is gone once the service returns `404 Not Found` or
/// `403 Forbidden`. The latter happens when the caller's permissions were
/// removed together with the project.
pub fn delete_project_wait_handler<G>(
    client: Arc<G>,
    container_id: impl Into<String>,
) -> AsyncActionHandler<Project>
where
    G: ProjectGetter + ?Sized + 'static,
{
    let container_id = container_id.into();
    let policy = StatusPolicy::new("project")
        .with_in_progress(&["DELETING"])
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let mut handler = AsyncActionHandler::new(move || {
        let client = client.clone();
        let container_id = container_id.clone();
        let policy = policy.clone();
        async move {
            match client.get_project(&container_id).await {
                Err(e) if e.http_status_code() == Some(403) => Ok(PollingResult::Completed(None)),
                fetched => policy.evaluate(fetched, |p| p.lifecycle_state.as_deref()),
            }
        }
    });
    handler.set_timeout(Duration::from_secs(15 * 60));
    handler
}
