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


//! Resource Manager: projects and folders.
//!
//! Projects are created asynchronously. The service returns the new project
//! in the `CREATING` state, use [wait::create_project_wait_handler] to wait
//! until it becomes `ACTIVE`.

use crate::Result;
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;
use std::collections::HashMap;

pub mod wait;

/// A STACKIT project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    /// The globally unique identifier, used in most API calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// The UUID of the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// One of `CREATING`, `ACTIVE`, `DELETING` or `INACTIVE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// The folder or organization containing a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A member of a project and its role.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub role: String,
    pub subject: String,
}

/// The request to create a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    pub container_parent_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub members: Vec<Member>,
}

impl CreateProjectPayload {
    pub fn new<P: Into<String>, N: Into<String>>(container_parent_id: P, name: N) -> Self {
        Self {
            container_parent_id: container_parent_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_label<K: Into<String>, V: Into<String>>(mut self, k: K, v: V) -> Self {
        self.labels.insert(k.into(), v.into());
        self
    }

    pub fn with_member<R: Into<String>, S: Into<String>>(mut self, role: R, subject: S) -> Self {
        self.members.push(Member {
            role: role.into(),
            subject: subject.into(),
        });
        self
    }
}

/// Fetches the current state of a project.
#[async_trait::async_trait]
pub trait ProjectGetter: std::fmt::Debug + Send + Sync {
    async fn get_project(&self, container_id: &str) -> Result<Project>;
}

/// A client for the Resource Manager service.
///
/// # Example
/// ```no_run
/// # use stackit_services::resourcemanager::{Client, ProjectGetter};
/// # tokio_test::block_on(async {
/// let client = Client::builder().build()?;
/// let project = client.get_project("my-container-id").await?;
/// println!("{project:?}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: RestClient,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Starts the creation of a project.
    pub async fn create_project(&self, payload: &CreateProjectPayload) -> Result<Project> {
        self.inner.post("/v2/projects", payload).await
    }

    /// Starts the deletion of a project.
    pub async fn delete_project(&self, container_id: &str) -> Result<()> {
        let id = path_parameter("container_id", container_id)?;
        self.inner.delete(&format!("/v2/projects/{id}")).await
    }
}

impl ServiceClient for Client {
    const ENDPOINT: ServiceEndpoint =
        ServiceEndpoint::new("resource-manager", "resource-manager.api");

    fn from_rest(inner: RestClient) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl ProjectGetter for Client {
    async fn get_project(&self, container_id: &str) -> Result<Project> {
        let id = path_parameter("container_id", container_id)?;
        self.inner.get(&format!("/v2/projects/{id}")).await
    }
}
