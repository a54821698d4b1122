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


//! Wait handlers for SKE operations.

use super::{Cluster, ClusterGetter};
use stackit_wait::{AsyncActionHandler, NotFound, PollContext, StatusPolicy};
use std::sync::Arc;
use std::time::Duration;

/// The number of `STATE_UNHEALTHY` observations tolerated before a create or
/// update fails.
///
/// New clusters often report `STATE_UNHEALTHY` while their nodes start.
pub const UNHEALTHY_BUDGET: u32 = 3;

/// Waits until a created or updated cluster is healthy (or hibernated).
pub fn create_or_update_cluster_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    cluster_name: impl Into<String>,
) -> AsyncActionHandler<Cluster>
where
    G: ClusterGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("cluster")
        .with_success(&["STATE_HEALTHY", "STATE_HIBERNATED"])
        .with_failure(&["STATE_UNHEALTHY"])
        .with_in_progress(&[
            "STATE_CREATING",
            "STATE_RECONCILING",
            "STATE_HIBERNATING",
            "STATE_WAKINGUP",
        ])
        .with_failure_budget(UNHEALTHY_BUDGET)
        .with_transient(crate::is_transient);
    let mut handler = handler(client, project_id.into(), cluster_name.into(), policy);
    handler.set_timeout(Duration::from_secs(45 * 60));
    handler
}

/// Waits until a cluster is deleted.
pub fn delete_cluster_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    cluster_name: impl Into<String>,
) -> AsyncActionHandler<Cluster>
where
    G: ClusterGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("cluster")
        .with_in_progress(&["STATE_DELETING"])
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let mut handler = handler(client, project_id.into(), cluster_name.into(), policy);
    handler.set_timeout(Duration::from_secs(15 * 60));
    handler
}

fn handler<G>(
    client: Arc<G>,
    project_id: String,
    cluster_name: String,
    policy: StatusPolicy,
) -> AsyncActionHandler<Cluster>
where
    G: ClusterGetter + ?Sized + 'static,
{
    AsyncActionHandler::with_context(move |context: PollContext| {
        if context.attempt() == 1 {
            policy.reset();
        }
        let client = client.clone();
        let project_id = project_id.clone();
        let cluster_name = cluster_name.clone();
        let policy = policy.clone();
        async move {
            let fetched = client.get_cluster(&project_id, &cluster_name).await;
            policy.evaluate(fetched, |c| {
                c.status.as_ref().and_then(|s| s.aggregated.as_deref())
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::super::ClusterStatus;
    use super::*;
    use crate::{Error, Result};
    use mockall::Sequence;
    use test_case::test_case;

    mockall::mock! {
        #[derive(Debug)]
        Getter {}
        #[async_trait::async_trait]
        impl ClusterGetter for Getter {
            async fn get_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster>;
        }
    }

    fn cluster(state: &str) -> Result<Cluster> {
        Ok(Cluster {
            name: Some("test-cluster".into()),
            status: Some(ClusterStatus {
                aggregated: Some(state.into()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn http_error(code: u16) -> Result<Cluster> {
        Err(Error::http(code, http::HeaderMap::new(), bytes::Bytes::new()))
    }

    fn sequence(responses: Vec<Result<Cluster>>) -> Arc<MockGetter> {
        let mut seq = Sequence::new();
        let mut mock = MockGetter::new();
        for r in responses {
            mock.expect_get_cluster()
                .withf(|p, c| p == "test-project" && c == "test-cluster")
                .times(1)
                .in_sequence(&mut seq)
                .return_once(move |_, _| r);
        }
        Arc::new(mock)
    }

    fn state(got: Option<Cluster>) -> Option<String> {
        got.and_then(|c| c.status).and_then(|s| s.aggregated)
    }

    #[test_case("STATE_HEALTHY")]
    #[test_case("STATE_HIBERNATED")]
    #[tokio::test(start_paused = true)]
    async fn create(done: &str) -> anyhow::Result<()> {
        let mock = sequence(vec![
            cluster("STATE_CREATING"),
            http_error(504),
            cluster("STATE_RECONCILING"),
            cluster(done),
        ]);
        let got = create_or_update_cluster_wait_handler(mock, "test-project", "test-cluster")
            .wait()
            .await?;
        assert_eq!(state(got).as_deref(), Some(done));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_tolerates_unhealthy() -> anyhow::Result<()> {
        let mock = sequence(vec![
            cluster("STATE_CREATING"),
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_HEALTHY"),
        ]);
        let got = create_or_update_cluster_wait_handler(mock, "test-project", "test-cluster")
            .wait()
            .await?;
        assert_eq!(state(got).as_deref(), Some("STATE_HEALTHY"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_unhealthy_budget_exhausted() -> anyhow::Result<()> {
        let mock = sequence(vec![
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_CREATING"),
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_UNHEALTHY"),
        ]);
        let err = create_or_update_cluster_wait_handler(mock, "test-project", "test-cluster")
            .wait()
            .await
            .unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
        assert!(err.to_string().contains("STATE_UNHEALTHY"), "{err}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn each_wait_gets_the_full_unhealthy_budget() -> anyhow::Result<()> {
        let mock = sequence(vec![
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_HEALTHY"),
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_UNHEALTHY"),
            cluster("STATE_HEALTHY"),
        ]);
        let mut handler =
            create_or_update_cluster_wait_handler(mock, "test-project", "test-cluster");
        let got = handler.wait().await?;
        assert_eq!(state(got).as_deref(), Some("STATE_HEALTHY"));
        let got = handler.wait().await?;
        assert_eq!(state(got).as_deref(), Some("STATE_HEALTHY"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_not_found_is_an_error() -> anyhow::Result<()> {
        let mock = sequence(vec![http_error(404)]);
        let err = create_or_update_cluster_wait_handler(mock, "test-project", "test-cluster")
            .wait()
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_missing_status() -> anyhow::Result<()> {
        let mock = sequence(vec![Ok(Cluster::default())]);
        let err = create_or_update_cluster_wait_handler(mock, "test-project", "test-cluster")
            .wait()
            .await
            .unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn delete() -> anyhow::Result<()> {
        let mock = sequence(vec![
            cluster("STATE_DELETING"),
            cluster("STATE_DELETING"),
            http_error(404),
        ]);
        let got = delete_cluster_wait_handler(mock, "test-project", "test-cluster")
            .wait()
            .await?;
        assert!(got.is_none(), "{got:?}");
        Ok(())
    }

    #[test]
    fn default_timeouts() {
        let mock = Arc::new(MockGetter::new());
        let h = create_or_update_cluster_wait_handler(mock.clone(), "p", "c");
        assert_eq!(h.timeout(), Duration::from_secs(45 * 60));
        let h = delete_cluster_wait_handler(mock, "p", "c");
        assert_eq!(h.timeout(), Duration::from_secs(15 * 60));
    }
}
