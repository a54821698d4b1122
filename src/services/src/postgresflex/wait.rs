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


//! Wait handlers for PostgreSQL Flex operations.

use super::{InstanceGetter, InstanceResponse, UserGetter, UserResponse};
use crate::Error;
use stackit_wait::{AsyncActionHandler, NotFound, PollContext, PollingResult, StatusPolicy};
use std::sync::Arc;
use std::time::Duration;

/// How long an update waits for the instance to report `Progressing`.
///
/// The service is slow to report that an update started. Without this wait,
/// the handler could observe the `Ready` state from before the update.
pub const UPDATE_TRANSITION_TIMEOUT: Duration = Duration::from_secs(60);

const SUCCESS: &[&str] = &["READY"];
const FAILURE: &[&str] = &["FAILED"];
const IN_PROGRESS: &[&str] = &["PROGRESSING", "PROCESSING"];

#[derive(Clone, Debug)]
struct InstanceRef {
    project_id: String,
    region: String,
    instance_id: String,
}

impl InstanceRef {
    async fn fetch<G>(&self, client: &G) -> crate::Result<InstanceResponse>
    where
        G: InstanceGetter + ?Sized,
    {
        client
            .get_instance(&self.project_id, &self.region, &self.instance_id)
            .await
    }
}

fn status(response: &InstanceResponse) -> Option<&str> {
    response.item.as_ref().and_then(|i| i.status.as_deref())
}

fn is_transient_or_bad_request(error: &Error) -> bool {
    crate::is_transient(error) || error.http_status_code() == Some(400)
}

/// Waits until a new instance is `Ready`.
///
/// Right after the creation request the service may return `404 Not Found`
/// or `400 Bad Request` for the new instance. The handler keeps polling in
/// both cases.
pub fn create_instance_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    region: impl Into<String>,
    instance_id: impl Into<String>,
) -> AsyncActionHandler<InstanceResponse>
where
    G: InstanceGetter + ?Sized + 'static,
{
    let instance = InstanceRef {
        project_id: project_id.into(),
        region: region.into(),
        instance_id: instance_id.into(),
    };
    let policy = StatusPolicy::new("instance")
        .with_success(SUCCESS)
        .with_failure(FAILURE)
        .with_in_progress(IN_PROGRESS)
        .with_not_found(NotFound::Continue)
        .with_transient(is_transient_or_bad_request);
    let mut handler = AsyncActionHandler::new(move || {
        let client = client.clone();
        let instance = instance.clone();
        let policy = policy.clone();
        async move { policy.evaluate(instance.fetch(client.as_ref()).await, status) }
    });
    handler.set_timeout(Duration::from_secs(45 * 60));
    handler
}

/// Waits until an updated instance is `Ready` again.
///
/// The first check waits, for at most [UPDATE_TRANSITION_TIMEOUT], until the
/// instance reports that the update started. If the instance never reports
/// it, the handler continues with the regular polling loop. The nested wait
/// observes the cancellation and the deadline of the outer wait.
pub fn partial_update_instance_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    region: impl Into<String>,
    instance_id: impl Into<String>,
) -> AsyncActionHandler<InstanceResponse>
where
    G: InstanceGetter + ?Sized + 'static,
{
    let instance = InstanceRef {
        project_id: project_id.into(),
        region: region.into(),
        instance_id: instance_id.into(),
    };
    let policy = StatusPolicy::new("instance")
        .with_success(SUCCESS)
        .with_failure(FAILURE)
        .with_in_progress(IN_PROGRESS)
        .with_transient(crate::is_transient);
    let mut handler = AsyncActionHandler::with_context(move |context: PollContext| {
        let client = client.clone();
        let instance = instance.clone();
        let policy = policy.clone();
        async move {
            if context.attempt() == 1 {
                wait_for_transition(client.clone(), instance.clone(), &context).await?;
            }
            policy.evaluate(instance.fetch(client.as_ref()).await, status)
        }
    });
    handler.set_timeout(Duration::from_secs(45 * 60));
    handler
}

async fn wait_for_transition<G>(
    client: Arc<G>,
    instance: InstanceRef,
    outer: &PollContext,
) -> crate::Result<()>
where
    G: InstanceGetter + ?Sized + 'static,
{
    let policy = StatusPolicy::new("instance update")
        .with_success(IN_PROGRESS)
        .with_failure(FAILURE)
        .with_transient(crate::is_transient);
    let mut transition = AsyncActionHandler::new(move || {
        let client = client.clone();
        let instance = instance.clone();
        let policy = policy.clone();
        async move { policy.evaluate(instance.fetch(client.as_ref()).await, status) }
    });
    // The nested wait never outlives the outer one.
    let remaining = outer.remaining();
    let capped = remaining < UPDATE_TRANSITION_TIMEOUT;
    transition.set_timeout(remaining.min(UPDATE_TRANSITION_TIMEOUT));
    match transition
        .wait_with_cancellation(outer.cancellation())
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if e.is_wait_timeout() && !capped => {
            tracing::warn!("the instance did not report the update start, continue polling: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Waits until an instance is deleted.
pub fn delete_instance_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    region: impl Into<String>,
    instance_id: impl Into<String>,
) -> AsyncActionHandler<InstanceResponse>
where
    G: InstanceGetter + ?Sized + 'static,
{
    let instance = InstanceRef {
        project_id: project_id.into(),
        region: region.into(),
        instance_id: instance_id.into(),
    };
    let policy = StatusPolicy::new("instance")
        .with_success(&["DELETED"])
        .with_failure(FAILURE)
        .with_in_progress(IN_PROGRESS)
        .with_not_found(NotFound::Success)
        .with_transient(crate::is_transient);
    let mut handler = AsyncActionHandler::new(move || {
        let client = client.clone();
        let instance = instance.clone();
        let policy = policy.clone();
        async move { policy.evaluate(instance.fetch(client.as_ref()).await, status) }
    });
    handler.set_timeout(Duration::from_secs(20 * 60));
    handler
}

/// Waits until a database user is deleted.
pub fn delete_user_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    region: impl Into<String>,
    instance_id: impl Into<String>,
    user_id: impl Into<String>,
) -> AsyncActionHandler<UserResponse>
where
    G: UserGetter + ?Sized + 'static,
{
    let instance = InstanceRef {
        project_id: project_id.into(),
        region: region.into(),
        instance_id: instance_id.into(),
    };
    let user_id: String = user_id.into();
    let mut handler = AsyncActionHandler::new(move || {
        let client = client.clone();
        let instance = instance.clone();
        let user_id = user_id.clone();
        async move {
            let fetched = client
                .get_user(
                    &instance.project_id,
                    &instance.region,
                    &instance.instance_id,
                    &user_id,
                )
                .await;
            match fetched {
                Ok(_) => Ok(PollingResult::InProgress),
                Err(e) if e.is_not_found() => Ok(PollingResult::Completed(None)),
                Err(e) if crate::is_transient(&e) => Ok(PollingResult::InProgress),
                Err(e) => Err(e),
            }
        }
    });
    handler.set_timeout(Duration::from_secs(2 * 60));
    handler
}

#[cfg(test)]
mod tests {
    use super::super::{Instance, User};
    use super::*;
    use crate::Result;
    use mockall::Sequence;

    mockall::mock! {
        #[derive(Debug)]
        Getter {}
        #[async_trait::async_trait]
        impl InstanceGetter for Getter {
            async fn get_instance(
                &self,
                project_id: &str,
                region: &str,
                instance_id: &str,
            ) -> Result<InstanceResponse>;
        }
        #[async_trait::async_trait]
        impl UserGetter for Getter {
            async fn get_user(
                &self,
                project_id: &str,
                region: &str,
                instance_id: &str,
                user_id: &str,
            ) -> Result<UserResponse>;
        }
    }

    fn instance(status: &str) -> Result<InstanceResponse> {
        Ok(InstanceResponse {
            item: Some(Instance {
                id: Some("test-instance".into()),
                status: Some(status.into()),
                ..Default::default()
            }),
        })
    }

    fn http_error<T>(code: u16) -> Result<T> {
        Err(Error::http(code, http::HeaderMap::new(), bytes::Bytes::new()))
    }

    fn instance_sequence(responses: Vec<Result<InstanceResponse>>) -> Arc<MockGetter> {
        let mut seq = Sequence::new();
        let mut mock = MockGetter::new();
        for r in responses {
            mock.expect_get_instance()
                .withf(|p, region, i| p == "test-project" && region == "eu01" && i == "test-instance")
                .times(1)
                .in_sequence(&mut seq)
                .return_once(move |_, _, _| r);
        }
        Arc::new(mock)
    }

    fn got_status(got: Option<InstanceResponse>) -> Option<String> {
        got.and_then(|r| r.item).and_then(|i| i.status)
    }

    #[tokio::test(start_paused = true)]
    async fn create() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![
            http_error(404),
            http_error(400),
            instance("Progressing"),
            instance("Ready"),
        ]);
        let got = create_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
            .wait()
            .await?;
        assert_eq!(got_status(got).as_deref(), Some("Ready"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_failed() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![
            http_error(404),
            http_error(400),
            instance("PROCESSING"),
            instance("FAILED"),
        ]);
        let err = create_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
            .wait()
            .await
            .unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
        assert!(
            err.to_string().contains("received status FAILED from server"),
            "{err}"
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn create_empty_response() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![Ok(InstanceResponse::default())]);
        let err = create_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
            .wait()
            .await
            .unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn partial_update() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![
            // The transition wait.
            instance("Ready"),
            instance("Progressing"),
            // The regular wait.
            instance("Progressing"),
            instance("Ready"),
        ]);
        let got =
            partial_update_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
                .wait()
                .await?;
        assert_eq!(got_status(got).as_deref(), Some("Ready"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn partial_update_transition_timeout() -> anyhow::Result<()> {
        let mut mock = MockGetter::new();
        mock.expect_get_instance()
            .returning(|_, _, _| instance("Ready"));
        let start = tokio::time::Instant::now();
        let got = partial_update_instance_wait_handler(
            Arc::new(mock),
            "test-project",
            "eu01",
            "test-instance",
        )
        .wait()
        .await?;
        assert_eq!(got_status(got).as_deref(), Some("Ready"));
        assert!(
            start.elapsed() >= UPDATE_TRANSITION_TIMEOUT,
            "{:?}",
            start.elapsed()
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn partial_update_cancelled_during_transition() -> anyhow::Result<()> {
        let mut mock = MockGetter::new();
        mock.expect_get_instance()
            .returning(|_, _, _| instance("Ready"));
        let mut handler = partial_update_instance_wait_handler(
            Arc::new(mock),
            "test-project",
            "eu01",
            "test-instance",
        );
        let cancel = tokio_util::sync::CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            trigger.cancel();
        });
        let start = tokio::time::Instant::now();
        let err = handler.wait_with_cancellation(&cancel).await.unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert!(start.elapsed() < UPDATE_TRANSITION_TIMEOUT, "{:?}", start.elapsed());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn partial_update_transition_respects_outer_timeout() -> anyhow::Result<()> {
        let mut mock = MockGetter::new();
        mock.expect_get_instance()
            .returning(|_, _, _| instance("Ready"));
        let mut handler = partial_update_instance_wait_handler(
            Arc::new(mock),
            "test-project",
            "eu01",
            "test-instance",
        );
        handler.set_timeout(Duration::from_secs(20));
        let start = tokio::time::Instant::now();
        let err = handler.wait().await.unwrap_err();
        assert!(err.is_wait_timeout(), "{err:?}");
        assert!(start.elapsed() <= Duration::from_secs(21), "{:?}", start.elapsed());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn partial_update_transition_failed() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![instance("Ready"), instance("Failed")]);
        let err =
            partial_update_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
                .wait()
                .await
                .unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn delete_instance() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![instance("Progressing"), http_error(404)]);
        let got = delete_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
            .wait()
            .await?;
        assert!(got.is_none(), "{got:?}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn delete_instance_marked_deleted() -> anyhow::Result<()> {
        let mock = instance_sequence(vec![instance("Progressing"), instance("Deleted")]);
        let got = delete_instance_wait_handler(mock, "test-project", "eu01", "test-instance")
            .wait()
            .await?;
        assert_eq!(got_status(got).as_deref(), Some("Deleted"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn delete_user() -> anyhow::Result<()> {
        let mut seq = Sequence::new();
        let mut mock = MockGetter::new();
        mock.expect_get_user()
            .withf(|_, _, i, u| i == "test-instance" && u == "test-user")
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| {
                Ok(UserResponse {
                    item: Some(User {
                        id: Some("test-user".into()),
                        ..Default::default()
                    }),
                })
            });
        mock.expect_get_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| http_error(404));
        let got = delete_user_wait_handler(
            Arc::new(mock),
            "test-project",
            "eu01",
            "test-instance",
            "test-user",
        )
        .wait()
        .await?;
        assert!(got.is_none(), "{got:?}");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn delete_user_permanent_error() -> anyhow::Result<()> {
        let mut mock = MockGetter::new();
        mock.expect_get_user()
            .times(1)
            .returning(|_, _, _, _| http_error(403));
        let err = delete_user_wait_handler(
            Arc::new(mock),
            "test-project",
            "eu01",
            "test-instance",
            "test-user",
        )
        .wait()
        .await
        .unwrap_err();
        assert_eq!(err.http_status_code(), Some(403), "{err:?}");
        Ok(())
    }
}
