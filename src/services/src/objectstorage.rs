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


//! Object Storage: buckets.
//!
//! Buckets do not report a status. A bucket is ready once the service
//! returns it, and deleted once the service returns `404 Not Found`.

use crate::Result;
use crate::client::{ClientBuilder, RestClient, ServiceClient, path_parameter};
use serde::{Deserialize, Serialize};
use stackit_core::config::ServiceEndpoint;

pub mod wait;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bucket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_path_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_virtual_hosted_style: Option<String>,
}

/// The response to [BucketGetter::get_bucket].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetBucketResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Bucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// The response to [Client::create_bucket].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBucketResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Fetches the current state of a bucket.
#[async_trait::async_trait]
pub trait BucketGetter: std::fmt::Debug + Send + Sync {
    async fn get_bucket(
        &self,
        project_id: &str,
        region: &str,
        bucket_name: &str,
    ) -> Result<GetBucketResponse>;
}

/// A client for the Object Storage service.
#[derive(Clone, Debug)]
pub struct Client {
    inner: RestClient,
}

impl Client {
    /// Returns a builder for [Client].
    pub fn builder() -> ClientBuilder<Self> {
        ClientBuilder::default()
    }

    /// Starts the creation of a bucket.
    pub async fn create_bucket(
        &self,
        project_id: &str,
        region: &str,
        bucket_name: &str,
    ) -> Result<CreateBucketResponse> {
        let path = bucket_path(project_id, region, bucket_name)?;
        self.inner.post(&path, &serde_json::Map::new()).await
    }

    /// Starts the deletion of a bucket.
    pub async fn delete_bucket(&self, project_id: &str, region: &str, bucket_name: &str) -> Result<()> {
        let path = bucket_path(project_id, region, bucket_name)?;
        self.inner.delete(&path).await
    }
}

fn bucket_path(project_id: &str, region: &str, bucket_name: &str) -> Result<String> {
    Ok(format!(
        "/v1/project/{}/region/{}/bucket/{}",
        path_parameter("project_id", project_id)?,
        path_parameter("region", region)?,
        path_parameter("bucket_name", bucket_name)?,
    ))
}

impl ServiceClient for Client {
    const ENDPOINT: ServiceEndpoint = ServiceEndpoint::new("object-storage", "object-storage.api");

    fn from_rest(inner: RestClient) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl BucketGetter for Client {
    async fn get_bucket(
        &self,
        project_id: &str,
        region: &str,
        bucket_name: &str,
    ) -> Result<GetBucketResponse> {
        let path = bucket_path(project_id, region, bucket_name)?;
        self.inner.get(&path).await
    }
}
