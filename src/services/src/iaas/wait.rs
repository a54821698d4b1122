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


//! Wait handlers for IaaS operations.

use super::{Network, NetworkGetter, Server, ServerGetter, Volume, VolumeGetter};
use crate::Result;
use stackit_wait::{AsyncActionHandler, NotFound, StatusPolicy};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// The delay before the first check of a resized server.
///
/// Right after the request the server still reports `ACTIVE` with the old
/// machine type.
pub const RESIZE_DELAY: Duration = Duration::from_secs(5);

type Fetch<T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'static>>;

fn server_status(s: &Server) -> Option<&str> {
    s.status.as_deref()
}

fn volume_status(v: &Volume) -> Option<&str> {
    v.status.as_deref()
}

fn network_state(n: &Network) -> Option<&str> {
    n.state.as_deref()
}

fn poll<T, F, Fut>(
    fetch: F,
    policy: StatusPolicy,
    status: fn(&T) -> Option<&str>,
) -> AsyncActionHandler<T>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    AsyncActionHandler::new(move || {
        let fetched = fetch();
        let policy = policy.clone();
        async move { policy.evaluate(fetched.await, status) }
    })
}

fn fetch_server<G>(
    client: Arc<G>,
    project_id: String,
    server_id: String,
) -> impl Fn() -> Fetch<Server> + Send + 'static
where
    G: ServerGetter + ?Sized + 'static,
{
    move || -> Fetch<Server> {
        let client = client.clone();
        let project_id = project_id.clone();
        let server_id = server_id.clone();
        Box::pin(async move { client.get_server(&project_id, &server_id).await })
    }
}

fn fetch_volume<G>(
    client: Arc<G>,
    project_id: String,
    volume_id: String,
) -> impl Fn() -> Fetch<Volume> + Send + 'static
where
    G: VolumeGetter + ?Sized + 'static,
{
    move || -> Fetch<Volume> {
        let client = client.clone();
        let project_id = project_id.clone();
        let volume_id = volume_id.clone();
        Box::pin(async move { client.get_volume(&project_id, &volume_id).await })
    }
}

fn fetch_network<G>(
    client: Arc<G>,
    project_id: String,
    network_id: String,
) -> impl Fn() -> Fetch<Network> + Send + 'static
where
    G: NetworkGetter + ?Sized + 'static,
{
    move || -> Fetch<Network> {
        let client = client.clone();
        let project_id = project_id.clone();
        let network_id = network_id.clone();
        Box::pin(async move { client.get_network(&project_id, &network_id).await })
    }
}

/// Waits until a new server is `ACTIVE`.
pub fn create_server_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    server_id: impl Into<String>,
) -> AsyncActionHandler<Server>
where
    G: ServerGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("server")
        .with_success(&["ACTIVE"])
        .with_failure(&["ERROR"])
        .with_in_progress(&["CREATING"])
        .with_transient(crate::is_transient);
    let fetch = fetch_server(client, project_id.into(), server_id.into());
    let mut handler = poll(fetch, policy, server_status);
    handler.set_timeout(Duration::from_secs(20 * 60));
    handler
}

/// Waits until a server is deleted.
///
/// The server is deleted once the service returns `404 Not Found` or reports
/// the `DELETED` status.
pub fn delete_server_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    server_id: impl Into<String>,
) -> AsyncActionHandler<Server>
where
    G: ServerGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("server")
        .with_success(&["DELETED"])
        .with_failure(&["ERROR"])
        .with_in_progress(&["DELETING"])
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let fetch = fetch_server(client, project_id.into(), server_id.into());
    let mut handler = poll(fetch, policy, server_status);
    handler.set_timeout(Duration::from_secs(20 * 60));
    handler
}

/// Waits until a resized server is `ACTIVE` again.
///
/// The first check happens after [RESIZE_DELAY].
pub fn resize_server_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    server_id: impl Into<String>,
) -> AsyncActionHandler<Server>
where
    G: ServerGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("server")
        .with_success(&["ACTIVE"])
        .with_failure(&["ERROR"])
        .with_in_progress(&["RESIZING"])
        .with_transient(crate::is_transient);
    let fetch = fetch_server(client, project_id.into(), server_id.into());
    let mut handler = poll(fetch, policy, server_status);
    handler
        .set_sleep_before_wait(RESIZE_DELAY)
        .set_timeout(Duration::from_secs(20 * 60));
    handler
}

/// Waits until a new volume is `AVAILABLE`.
pub fn create_volume_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    volume_id: impl Into<String>,
) -> AsyncActionHandler<Volume>
where
    G: VolumeGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("volume")
        .with_success(&["AVAILABLE"])
        .with_failure(&["ERROR"])
        .with_in_progress(&["CREATING"])
        .with_transient(crate::is_transient);
    let fetch = fetch_volume(client, project_id.into(), volume_id.into());
    let mut handler = poll(fetch, policy, volume_status);
    handler.set_timeout(Duration::from_secs(10 * 60));
    handler
}

/// Waits until a volume is deleted.
pub fn delete_volume_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    volume_id: impl Into<String>,
) -> AsyncActionHandler<Volume>
where
    G: VolumeGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("volume")
        .with_success(&["DELETED"])
        .with_failure(&["ERROR"])
        .with_in_progress(&["DELETING"])
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let fetch = fetch_volume(client, project_id.into(), volume_id.into());
    let mut handler = poll(fetch, policy, volume_status);
    handler.set_timeout(Duration::from_secs(10 * 60));
    handler
}

/// Waits until a new network is `CREATED`.
pub fn create_network_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    network_id: impl Into<String>,
) -> AsyncActionHandler<Network>
where
    G: NetworkGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("network")
        .with_success(&["CREATED"])
        .with_in_progress(&["CREATING"])
        .with_transient(crate::is_transient);
    let fetch = fetch_network(client, project_id.into(), network_id.into());
    let mut handler = poll(fetch, policy, network_state);
    handler.set_timeout(Duration::from_secs(10 * 60));
    handler
}

/// Waits until a network is deleted.
pub fn delete_network_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    network_id: impl Into<String>,
) -> AsyncActionHandler<Network>
where
    G: NetworkGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("network")
        .with_in_progress(&["DELETING"])
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let fetch = fetch_network(client, project_id.into(), network_id.into());
    let mut handler = poll(fetch, policy, network_state);
    handler.set_timeout(Duration::from_secs(10 * 60));
    handler
}
