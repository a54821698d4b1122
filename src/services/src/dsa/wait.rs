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


//! Wait handlers for data service operations.

use super::{Instance, InstanceGetter, OperationType};
use stackit_wait::{AsyncActionHandler, NotFound, PollingResult, StatusPolicy};
use std::sync::Arc;
use std::time::Duration;

/// Waits until the creation of an instance succeeds.
pub fn create_instance_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    instance_id: impl Into<String>,
) -> AsyncActionHandler<Instance>
where
    G: InstanceGetter + ?Sized + 'static,
{
    handler(
        client,
        project_id.into(),
        instance_id.into(),
        OperationType::Create,
        NotFound::Fail,
    )
}

/// Waits until the update of an instance succeeds.
pub fn partial_update_instance_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    instance_id: impl Into<String>,
) -> AsyncActionHandler<Instance>
where
    G: InstanceGetter + ?Sized + 'static,
{
    handler(
        client,
        project_id.into(),
        instance_id.into(),
        OperationType::Update,
        NotFound::Fail,
    )
}

/// Waits until an instance is deleted.
///
/// Deleted instances return `410 Gone` or `404 Not Found`.
pub fn delete_instance_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    instance_id: impl Into<String>,
) -> AsyncActionHandler<Instance>
where
    G: InstanceGetter + ?Sized + 'static,
{
    handler(
        client,
        project_id.into(),
        instance_id.into(),
        OperationType::Delete,
        NotFound::Success,
    )
}

fn handler<G>(
    client: Arc<G>,
    project_id: String,
    instance_id: String,
    kind: OperationType,
    not_found: NotFound,
) -> AsyncActionHandler<Instance>
where
    G: InstanceGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("instance")
        .with_success(&["succeeded"])
        .with_failure(&["failed"])
        .with_in_progress(&["in progress"])
        .with_not_found(not_found)
        .with_transient(crate::is_transient);
    let mut handler = AsyncActionHandler::new(move || {
        let client = client.clone();
        let project_id = project_id.clone();
        let instance_id = instance_id.clone();
        let policy = policy.clone();
        async move {
            let fetched = client.get_instance(&project_id, &instance_id).await;
            if let Ok(instance) = &fetched {
                if !instance.last_operation_is(kind)? {
                    tracing::debug!(
                        instance_id = %instance_id,
                        operation = kind.as_str(),
                        "waiting for the operation to start"
                    );
                    return Ok(PollingResult::InProgress);
                }
            }
            policy.evaluate(fetched, |i| {
                i.last_operation.as_ref().and_then(|op| op.state.as_deref())
            })
        }
    });
    handler.set_timeout(Duration::from_secs(45 * 60));
    handler
}
