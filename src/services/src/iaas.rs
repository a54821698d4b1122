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


//! IaaS: servers, volumes and networks.

use crate::Result;
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;
use std::collections::HashMap;

pub mod wait;

/// A virtual machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// For example `CREATING`, `ACTIVE`, `RESIZING` or `ERROR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Set when `status` is `ERROR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// The request to create a server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateServerPayload {
    pub name: String,
    pub machine_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_volume: Option<BootVolume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networking: Option<Networking>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootVolume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VolumeSource>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeSource {
    /// For example `image` or `snapshot`.
    #[serde(rename = "type")]
    pub source_type: String,
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Networking {
    pub network_id: String,
}

/// The request to change the machine type of a server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeServerPayload {
    pub machine_type: String,
}

/// A block storage volume.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Volume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// For example `CREATING`, `AVAILABLE` or `DELETED`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_class: Option<String>,
}

/// The request to create a volume.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateVolumePayload {
    pub name: String,
    pub size: u64,
    pub availability_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_class: Option<String>,
}

/// A network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Network {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// For example `CREATING`, `CREATED` or `DELETING`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
}

/// The request to create a network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateNetworkPayload {
    pub name: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

/// Fetches the current state of a server.
#[async_trait::async_trait]
pub trait ServerGetter: std::fmt::Debug + Send + Sync {
    async fn get_server(&self, project_id: &str, server_id: &str) -> Result<Server>;
}

/// Fetches the current state of a volume.
#[async_trait::async_trait]
pub trait VolumeGetter: std::fmt::Debug + Send + Sync {
    async fn get_volume(&self, project_id: &str, volume_id: &str) -> Result<Volume>;
}

/// Fetches the current state of a network.
#[async_trait::async_trait]
pub trait NetworkGetter: std::fmt::Debug + Send + Sync {
    async fn get_network(&self, project_id: &str, network_id: &str) -> Result<Network>;
}

/// A client for the IaaS service.
#[derive(Clone, Debug)]
pub struct Client {
    inner: RestClient,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Starts the creation of a server.
    pub async fn create_server(
        &self,
        project_id: &str,
        payload: &CreateServerPayload,
    ) -> Result<Server> {
        let path = collection_path(project_id, "servers")?;
        self.inner.post(&path, payload).await
    }

    /// Starts the deletion of a server.
    pub async fn delete_server(&self, project_id: &str, server_id: &str) -> Result<()> {
        let path = resource_path(project_id, "servers", "server_id", server_id)?;
        self.inner.delete(&path).await
    }

    /// Starts changing the machine type of a server.
    pub async fn resize_server(
        &self,
        project_id: &str,
        server_id: &str,
        payload: &ResizeServerPayload,
    ) -> Result<()> {
        let path = resource_path(project_id, "servers", "server_id", server_id)?;
        self.inner
            .post_empty(&format!("{path}/resize"), payload)
            .await
    }

    /// Starts the creation of a volume.
    pub async fn create_volume(
        &self,
        project_id: &str,
        payload: &CreateVolumePayload,
    ) -> Result<Volume> {
        let path = collection_path(project_id, "volumes")?;
        self.inner.post(&path, payload).await
    }

    /// Starts the deletion of a volume.
    pub async fn delete_volume(&self, project_id: &str, volume_id: &str) -> Result<()> {
        let path = resource_path(project_id, "volumes", "volume_id", volume_id)?;
        self.inner.delete(&path).await
    }

    /// Starts the creation of a network.
    pub async fn create_network(
        &self,
        project_id: &str,
        payload: &CreateNetworkPayload,
    ) -> Result<Network> {
        let path = collection_path(project_id, "networks")?;
        self.inner.post(&path, payload).await
    }

    /// Starts the deletion of a network.
    pub async fn delete_network(&self, project_id: &str, network_id: &str) -> Result<()> {
        let path = resource_path(project_id, "networks", "network_id", network_id)?;
        self.inner.delete(&path).await
    }
}

fn collection_path(project_id: &str, collection: &str) -> Result<String> {
    Ok(format!(
        "/v1/projects/{}/{collection}",
        path_parameter("project_id", project_id)?
    ))
}

fn resource_path(project_id: &str, collection: &str, name: &str, id: &str) -> Result<String> {
    Ok(format!(
        "{}/{}",
        collection_path(project_id, collection)?,
        path_parameter(name, id)?
    ))
}

impl ServiceClient for Client {
    const ENDPOINT: ServiceEndpoint = ServiceEndpoint::new("iaas", "iaas.api");

    fn from_rest(inner: RestClient) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl ServerGetter for Client {
    async fn get_server(&self, project_id: &str, server_id: &str) -> Result<Server> {
        let path = resource_path(project_id, "servers", "server_id", server_id)?;
        self.inner.get(&path).await
    }
}

#[async_trait::async_trait]
impl VolumeGetter for Client {
    async fn get_volume(&self, project_id: &str, volume_id: &str) -> Result<Volume> {
        let path = resource_path(project_id, "volumes", "volume_id", volume_id)?;
        self.inner.get(&path).await
    }
}

#[async_trait::async_trait]
impl NetworkGetter for Client {
    async fn get_network(&self, project_id: &str, network_id: &str) -> Result<Network> {
        let path = resource_path(project_id, "networks", "network_id", network_id)?;
        self.inner.get(&path).await
    }
}
