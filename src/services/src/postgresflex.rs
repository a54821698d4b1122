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


//! PostgreSQL Flex: managed PostgreSQL instances and their users.

use crate::Result;
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;
use std::collections::HashMap;

pub mod wait;

/// A PostgreSQL Flex instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Instance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// For example `Ready`, `Progressing` or `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<Flavor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Acl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_schedule: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Flavor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Storage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The IP ranges allowed to connect to an instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Acl {
    pub items: Vec<String>,
}

/// The response to [InstanceGetter::get_instance].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstanceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Instance>,
}

/// The response to [Client::create_instance].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateInstanceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The request to create an instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub name: String,
    pub flavor_id: String,
    pub replicas: u32,
    pub storage: Storage,
    pub version: String,
    pub acl: Acl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_schedule: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

/// The request to change some fields of an instance.
///
/// Fields set to `None` are not modified.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialUpdateInstancePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Acl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_schedule: Option<String>,
}

/// A database user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// The response to [UserGetter::get_user].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<User>,
}

/// Fetches the current state of an instance.
#[async_trait::async_trait]
pub trait InstanceGetter: std::fmt::Debug + Send + Sync {
    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<InstanceResponse>;
}

/// Fetches the current state of a database user.
#[async_trait::async_trait]
pub trait UserGetter: std::fmt::Debug + Send + Sync {
    async fn get_user(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        user_id: &str,
    ) -> Result<UserResponse>;
}

/// A client for the PostgreSQL Flex service.
#[derive(Clone, Debug)]
pub struct Client {
    inner: RestClient,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Starts the creation of an instance.
    pub async fn create_instance(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse> {
        let path = format!("{}/instances", region_path(project_id, region)?);
        self.inner.post(&path, payload).await
    }

    /// Starts an update of some fields of an instance.
    pub async fn partial_update_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<()> {
        let path = instance_path(project_id, region, instance_id)?;
        self.inner.patch(&path, payload).await
    }

    /// Starts the deletion of an instance.
    pub async fn delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<()> {
        let path = instance_path(project_id, region, instance_id)?;
        self.inner.delete(&path).await
    }

    /// Starts the deletion of a database user.
    pub async fn delete_user(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        user_id: &str,
    ) -> Result<()> {
        let path = user_path(project_id, region, instance_id, user_id)?;
        self.inner.delete(&path).await
    }
}

fn region_path(project_id: &str, region: &str) -> Result<String> {
    Ok(format!(
        "/v2/projects/{}/regions/{}",
        path_parameter("project_id", project_id)?,
        path_parameter("region", region)?,
    ))
}

fn instance_path(project_id: &str, region: &str, instance_id: &str) -> Result<String> {
    Ok(format!(
        "{}/instances/{}",
        region_path(project_id, region)?,
        path_parameter("instance_id", instance_id)?,
    ))
}

fn user_path(project_id: &str, region: &str, instance_id: &str, user_id: &str) -> Result<String> {
    Ok(format!(
        "{}/users/{}",
        instance_path(project_id, region, instance_id)?,
        path_parameter("user_id", user_id)?,
    ))
}

impl ServiceClient for Client {
    const ENDPOINT: ServiceEndpoint =
        ServiceEndpoint::new("postgresflex", "postgres-flex-service.api");

    fn from_rest(inner: RestClient) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl InstanceGetter for Client {
    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> Result<InstanceResponse> {
        let path = instance_path(project_id, region, instance_id)?;
        self.inner.get(&path).await
    }
}

#[async_trait::async_trait]
impl UserGetter for Client {
    async fn get_user(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        user_id: &str,
    ) -> Result<UserResponse> {
        let path = user_path(project_id, region, instance_id, user_id)?;
        self.inner.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_builder;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;

    const INSTANCE: &str = "/v2/projects/test-project/regions/eu01/instances/test-instance";

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn create_instance() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/v2/projects/test-project/regions/eu01/instances"),
                request::body(json_decoded(eq(json!({
                    "name": "test-instance",
                    "flavorId": "2.4",
                    "replicas": 1,
                    "storage": {"class": "premium-perf2-stackit", "size": 10},
                    "version": "16",
                    "acl": {"items": ["0.0.0.0/0"]}
                })))),
            ])
            .respond_with(json_encoded(json!({"id": "test-instance"}))),
        );

        let client = test_builder::<Client>(&server.url_str("/")).build()?;
        let payload = CreateInstancePayload {
            name: "test-instance".into(),
            flavor_id: "2.4".into(),
            replicas: 1,
            storage: Storage {
                class: Some("premium-perf2-stackit".into()),
                size: Some(10),
            },
            version: "16".into(),
            acl: Acl {
                items: vec!["0.0.0.0/0".into()],
            },
            ..Default::default()
        };
        let got = client
            .create_instance("test-project", "eu01", &payload)
            .await?;
        assert_eq!(got.id.as_deref(), Some("test-instance"));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn update_and_delete() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PATCH", INSTANCE),
                request::body(json_decoded(eq(json!({"replicas": 3})))),
            ])
            .respond_with(status_code(202)),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", INSTANCE))
                .respond_with(status_code(204)),
        );
        let user = format!("{INSTANCE}/users/test-user");
        server.expect(
            Expectation::matching(request::method_path("GET", user.clone())).respond_with(
                json_encoded(json!({"item": {"id": "test-user", "username": "app", "roles": ["login"]}})),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", user))
                .respond_with(status_code(204)),
        );

        let client = test_builder::<Client>(&server.url_str("/")).build()?;
        let payload = PartialUpdateInstancePayload {
            replicas: Some(3),
            ..Default::default()
        };
        client
            .partial_update_instance("test-project", "eu01", "test-instance", &payload)
            .await?;
        client
            .delete_instance("test-project", "eu01", "test-instance")
            .await?;
        let got = client
            .get_user("test-project", "eu01", "test-instance", "test-user")
            .await?;
        let roles = got.item.map(|u| u.roles).unwrap_or_default();
        assert_eq!(roles, vec!["login"]);
        client
            .delete_user("test-project", "eu01", "test-instance", "test-user")
            .await?;
        Ok(())
    }

    #[test]
    fn paths() -> anyhow::Result<()> {
        assert_eq!(instance_path("test-project", "eu01", "test-instance")?, INSTANCE);
        let err = user_path("test-project", "eu01", "test-instance", "").unwrap_err();
        assert!(err.to_string().contains("user_id"), "{err}");
        Ok(())
    }
}
