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


//! Load Balancer: network load balancers.

use crate::Result;
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;

pub mod wait;

/// A load balancer.
///
/// The same type is used to create load balancers. Output only fields, such
/// as `status`, are ignored in requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadBalancer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<Listener>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_pools: Vec<TargetPool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<Network>,
    /// For example `STATUS_READY` or `STATUS_PENDING`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<LoadBalancerError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Listener {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pool: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetPool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Network {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadBalancerError {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fetches the current state of a load balancer.
#[async_trait::async_trait]
pub trait LoadBalancerGetter: std::fmt::Debug + Send + Sync {
    async fn get_load_balancer(&self, project_id: &str, name: &str) -> Result<LoadBalancer>;
}

/// A client for the Load Balancer service.
#[derive(Clone, Debug)]
pub struct Client {
    inner: RestClient,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Starts the creation of a load balancer.
    pub async fn create_load_balancer(
        &self,
        project_id: &str,
        payload: &LoadBalancer,
    ) -> Result<LoadBalancer> {
        let path = format!(
            "/v1/projects/{}/load-balancers",
            path_parameter("project_id", project_id)?
        );
        self.inner.post(&path, payload).await
    }

    /// Starts the deletion of a load balancer.
    pub async fn delete_load_balancer(&self, project_id: &str, name: &str) -> Result<()> {
        let path = load_balancer_path(project_id, name)?;
        self.inner.delete(&path).await
    }
}

fn load_balancer_path(project_id: &str, name: &str) -> Result<String> {
    Ok(format!(
        "/v1/projects/{}/load-balancers/{}",
        path_parameter("project_id", project_id)?,
        path_parameter("name", name)?,
    ))
}

impl ServiceClient for Client {
    const ENDPOINT: ServiceEndpoint = ServiceEndpoint::new("load-balancer", "load-balancer.api");

    fn from_rest(inner: RestClient) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl LoadBalancerGetter for Client {
    async fn get_load_balancer(&self, project_id: &str, name: &str) -> Result<LoadBalancer> {
        let path = load_balancer_path(project_id, name)?;
        self.inner.get(&path).await
    }
}
