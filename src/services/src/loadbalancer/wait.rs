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


//! Wait handlers for Load Balancer operations.

use super::{LoadBalancer, LoadBalancerGetter};
use stackit_wait::{AsyncActionHandler, NotFound, StatusPolicy};
use std::sync::Arc;
use std::time::Duration;

/// Waits until a new load balancer is ready.
pub fn create_load_balancer_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    name: impl Into<String>,
) -> AsyncActionHandler<LoadBalancer>
where
    G: LoadBalancerGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("load balancer")
        .with_success(&["STATUS_READY"])
        .with_failure(&["STATUS_TERMINATING", "STATUS_ERROR"])
        .with_in_progress(&["STATUS_PENDING", "STATUS_UNSPECIFIED"])
        .with_transient(crate::is_transient);
    let mut handler = handler(client, project_id.into(), name.into(), policy);
    handler.set_timeout(Duration::from_secs(20 * 60));
    handler
}

/// Waits until a load balancer is deleted.
pub fn delete_load_balancer_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    name: impl Into<String>,
) -> AsyncActionHandler<LoadBalancer>
where
    G: LoadBalancerGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("load balancer")
        .with_in_progress(&["STATUS_TERMINATING"])
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let mut handler = handler(client, project_id.into(), name.into(), policy);
    handler.set_timeout(Duration::from_secs(20 * 60));
    handler
}

fn handler<G>(
    client: Arc<G>,
    project_id: String,
    name: String,
    policy: StatusPolicy,
) -> AsyncActionHandler<LoadBalancer>
where
    G: LoadBalancerGetter + ?Sized + 'static,
{
    AsyncActionHandler::new(move || {
        let client = client.clone();
        let project_id = project_id.clone();
        let name = name.clone();
        let policy = policy.clone();
        async move {
            let fetched = client.get_load_balancer(&project_id, &name).await;
            policy.evaluate(fetched, |lb| lb.status.as_deref())
        }
    })
}
