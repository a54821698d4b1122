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


#[cfg(test)]
mod tests {
    use httptest::{Expectation, Server, cycle, matchers::*, responders::*};
    use serde_json::json;
    use stackit_auth::credentials::static_token;
    use stackit_core::config::{Environment, RetryConfig};
    use stackit_services::resourcemanager::{self, ProjectGetter};
    use stackit_services::{postgresflex, resourcemanager::wait as project_wait};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    type TestResult = anyhow::Result<()>;

    fn retry_config() -> RetryConfig {
        RetryConfig::default()
            .with_max_retries(3)
            .with_wait_between_calls(Duration::from_millis(1))
            .with_timeout(Duration::from_secs(5))
    }

    fn postgres_client(server: &Server) -> anyhow::Result<postgresflex::Client> {
        let client = postgresflex::Client::builder()
            .with_endpoint(server.url_str("/"))
            .with_environment(Environment::Prod)
            .with_credentials(static_token::Builder::new("test-token").build())
            .with_retry_config(retry_config())
            .build()?;
        Ok(client)
    }

    fn project_client(server: &Server) -> anyhow::Result<resourcemanager::Client> {
        let client = resourcemanager::Client::builder()
            .with_endpoint(server.url_str("/"))
            .with_environment(Environment::Prod)
            .with_credentials(static_token::Builder::new("test-token").build())
            .with_retry_config(retry_config())
            .build()?;
        Ok(client)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn postgres_create_reports_failure() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path(
                    "GET",
                    "/v2/projects/test-project/regions/eu01/instances/test-instance"
                ),
                request::headers(contains(("authorization", "Bearer test-token"))),
            ])
            .times(4)
            .respond_with(cycle![
                status_code(404),
                status_code(400),
                json_encoded(json!({"item": {"status": "PROCESSING"}})),
                json_encoded(json!({"item": {"status": "FAILED"}})),
            ]),
        );

        let client = Arc::new(postgres_client(&server)?);
        let mut handler = postgresflex::wait::create_instance_wait_handler(
            client,
            "test-project",
            "eu01",
            "test-instance",
        );
        handler.set_poll_interval(Duration::from_millis(200));
        let start = Instant::now();
        let err = handler.wait().await.unwrap_err();
        let elapsed = start.elapsed();
        assert!(err.is_operation_failed(), "{err:?}");
        assert!(
            err.to_string().contains("received status FAILED from server"),
            "{err}"
        );
        assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(1), "{elapsed:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn project_delete_completes_on_not_found() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/v2/projects/test-project"))
                .respond_with(status_code(202)),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/v2/projects/test-project"))
                .times(2)
                .respond_with(cycle![
                    json_encoded(json!({
                        "containerId": "test-project",
                        "lifecycleState": "DELETING",
                    })),
                    status_code(404),
                ]),
        );

        let client = Arc::new(project_client(&server)?);
        client.delete_project("test-project").await?;
        let mut handler = project_wait::delete_project_wait_handler(client, "test-project");
        handler.set_poll_interval(Duration::from_millis(50));
        let got = handler.wait().await?;
        assert!(got.is_none(), "{got:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn transport_gives_up_after_max_retries() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v2/projects/test-project"))
                .times(3)
                .respond_with(status_code(502)),
        );

        let client = project_client(&server)?;
        let err = client.get_project("test-project").await.unwrap_err();
        assert_eq!(err.http_status_code(), Some(502), "{err:?}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancelled_wait_stops_polling() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v2/projects/test-project"))
                .times(1..)
                .respond_with(json_encoded(json!({
                    "containerId": "test-project",
                    "lifecycleState": "CREATING",
                }))),
        );

        let client = Arc::new(project_client(&server)?);
        let mut handler = project_wait::create_project_wait_handler(client, "test-project");
        handler.set_poll_interval(Duration::from_millis(50));
        let cancel = tokio_util::sync::CancellationToken::new();
        let child = cancel.clone();
        let task = tokio::spawn(async move { handler.wait_with_cancellation(&child).await });
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
        let err = task.await?.unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        Ok(())
    }
}
