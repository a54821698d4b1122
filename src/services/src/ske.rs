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


//! SKE: the STACKIT Kubernetes Engine.

use crate::Result;
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;

pub mod wait;

/// A Kubernetes cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<Kubernetes>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodepools: Vec<Nodepool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Kubernetes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Nodepool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<Machine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Machine {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The reconciliation state of a cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterStatus {
    /// The overall state, for example `STATE_HEALTHY` or `STATE_CREATING`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hibernated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ClusterError>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The request to create or update a cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOrUpdateClusterPayload {
    pub kubernetes: Kubernetes,
    pub nodepools: Vec<Nodepool>,
}

/// Fetches the current state of a cluster.
#[async_trait::async_trait]
pub trait ClusterGetter: std::fmt::Debug + Send + Sync {
    async fn get_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster>;
}

/// A client for the SKE service.
#[derive(Clone, Debug)]
pub struct Client {
    inner: RestClient,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Creates a cluster, or updates an existing cluster with the same name.
    pub async fn create_or_update_cluster(
        &self,
        project_id: &str,
        cluster_name: &str,
        payload: &CreateOrUpdateClusterPayload,
    ) -> Result<Cluster> {
        let path = cluster_path(project_id, cluster_name)?;
        self.inner.put(&path, payload).await
    }

    /// Starts the deletion of a cluster.
    pub async fn delete_cluster(&self, project_id: &str, cluster_name: &str) -> Result<()> {
        let path = cluster_path(project_id, cluster_name)?;
        self.inner.delete(&path).await
    }
}

fn cluster_path(project_id: &str, cluster_name: &str) -> Result<String> {
    Ok(format!(
        "/v1/projects/{}/clusters/{}",
        path_parameter("project_id", project_id)?,
        path_parameter("cluster_name", cluster_name)?,
    ))
}

impl ServiceClient for Client {
    const ENDPOINT: ServiceEndpoint = ServiceEndpoint::new("ske", "ske.api.eu01");

    fn from_rest(inner: RestClient) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl ClusterGetter for Client {
    async fn get_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster> {
        let path = cluster_path(project_id, cluster_name)?;
        self.inner.get(&path).await
    }
}
