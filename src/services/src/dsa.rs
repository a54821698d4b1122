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


//! Data services: MariaDB, Redis, RabbitMQ, OpenSearch and LogMe.
//!
//! These services share the same API, only the endpoint changes. The
//! [Client] is generic over the [Offering] and there is a type alias for each
//! service, e.g. [RedisClient].
//!
//! Instances report the progress of the last operation in
//! [Instance::last_operation]. The wait handlers only consider the state of
//! the operation they wait for, the state of an older operation is ignored.

use crate::{Error, Result};
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;
use std::collections::HashMap;
use std::marker::PhantomData;

pub mod wait;

/// A data service offering.
pub trait Offering: std::fmt::Debug + Send + Sync + 'static {
    const ENDPOINT: ServiceEndpoint;
}

macro_rules! offering {
    ($name:ident, $alias:ident, $service:literal, $host:literal) => {
        #[doc = concat!("The `", $service, "` offering.")]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl Offering for $name {
            const ENDPOINT: ServiceEndpoint = ServiceEndpoint::new($service, $host);
        }

        #[doc = concat!("A client for the `", $service, "` service.")]
        pub type $alias = Client<$name>;
    };
}

offering!(MariaDb, MariaDbClient, "mariadb", "mariadb.api");
offering!(Redis, RedisClient, "redis", "redis.api");
offering!(RabbitMq, RabbitMqClient, "rabbitmq", "rabbitmq.api");
offering!(OpenSearch, OpenSearchClient, "opensearch", "opensearch.api");
offering!(LogMe, LogMeClient, "logme", "logme.api");

/// A data service instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Instance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl Instance {
    /// Returns `true` if the last operation is of the given type.
    ///
    /// Instances without a last operation return `true`, so the handlers
    /// report the missing field. A last operation without a type is an
    /// error.
    pub(crate) fn last_operation_is(&self, kind: OperationType) -> Result<bool> {
        match &self.last_operation {
            None => Ok(true),
            Some(LastOperation { r#type: None, .. }) => Err(Error::deser(
                "the instance has a last operation without a type",
            )),
            Some(op) => Ok(op.r#type.as_deref() == Some(kind.as_str())),
        }
    }
}

/// The last operation executed on an instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LastOperation {
    /// One of `create`, `update` or `delete`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    /// One of `in progress`, `succeeded` or `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The kind of operation executed on an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationType {
    Create,
    Update,
    Delete,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// The request to create an instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub instance_name: String,
    pub plan_id: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
}

/// The response to [Client::create_instance].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateInstanceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// The request to change the plan or the parameters of an instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialUpdateInstancePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
}

/// Fetches the current state of an instance.
#[async_trait::async_trait]
pub trait InstanceGetter: std::fmt::Debug + Send + Sync {
    async fn get_instance(&self, project_id: &str, instance_id: &str) -> Result<Instance>;
}

/// A client for a data service.
///
/// # Example
/// ```no_run
/// # use stackit_services::dsa::{InstanceGetter, RedisClient};
/// # tokio_test::block_on(async {
/// let client = RedisClient::builder().build()?;
/// let instance = client.get_instance("my-project", "my-instance").await?;
/// println!("{instance:?}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
pub struct Client<O> {
    inner: RestClient,
    offering: PhantomData<O>,
}

impl<O> Clone for Client<O> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            offering: PhantomData,
        }
    }
}

impl<O: Offering> std::fmt::Debug for Client<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("service", &O::ENDPOINT.name())
            .field("inner", &self.inner)
            .finish()
    }
}

impl<O: Offering> Client<O> {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Starts the creation of an instance.
    pub async fn create_instance(
        &self,
        project_id: &str,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse> {
        let path = format!(
            "/v1/projects/{}/instances",
            path_parameter("project_id", project_id)?
        );
        self.inner.post(&path, payload).await
    }

    /// Starts an update of an instance.
    pub async fn partial_update_instance(
        &self,
        project_id: &str,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<()> {
        let path = instance_path(project_id, instance_id)?;
        self.inner.patch(&path, payload).await
    }

    /// Starts the deletion of an instance.
    pub async fn delete_instance(&self, project_id: &str, instance_id: &str) -> Result<()> {
        let path = instance_path(project_id, instance_id)?;
        self.inner.delete(&path).await
    }
}

fn instance_path(project_id: &str, instance_id: &str) -> Result<String> {
    Ok(format!(
        "/v1/projects/{}/instances/{}",
        path_parameter("project_id", project_id)?,
        path_parameter("instance_id", instance_id)?,
    ))
}

impl<O: Offering> ServiceClient for Client<O> {
    const ENDPOINT: ServiceEndpoint = O::ENDPOINT;

    fn from_rest(inner: RestClient) -> Self {
        Self {
            inner,
            offering: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<O: Offering> InstanceGetter for Client<O> {
    async fn get_instance(&self, project_id: &str, instance_id: &str) -> Result<Instance> {
        let path = instance_path(project_id, instance_id)?;
        self.inner.get(&path).await
    }
}
