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


//! Wait handlers for Object Storage operations.

use super::{BucketGetter, GetBucketResponse};
use crate::Error;
use stackit_wait::{AsyncActionHandler, PollingResult};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct BucketRef {
    project_id: String,
    region: String,
    bucket_name: String,
}

impl BucketRef {
    fn new(project_id: impl Into<String>, region: impl Into<String>, bucket_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            bucket_name: bucket_name.into(),
        }
    }
}

/// Waits until a new bucket is available.
///
/// The service returns `404 Not Found` until the bucket is created.
pub fn create_bucket_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    region: impl Into<String>,
    bucket_name: impl Into<String>,
) -> AsyncActionHandler<GetBucketResponse>
where
    G: BucketGetter + ?Sized + 'static,
{
    let bucket = BucketRef::new(project_id, region, bucket_name);
    AsyncActionHandler::new(move || {
        let client = client.clone();
        let bucket = bucket.clone();
        async move {
            let fetched = client
                .get_bucket(&bucket.project_id, &bucket.region, &bucket.bucket_name)
                .await;
            match fetched {
                Ok(response) if response.bucket.is_none() => Err(Error::deser(
                    "the bucket response does not include the bucket",
                )),
                Ok(response) => Ok(PollingResult::Completed(Some(response))),
                Err(e) if e.is_not_found() || crate::is_transient(&e) => {
                    tracing::debug!(bucket = %bucket.bucket_name, "bucket not ready: {e}");
                    Ok(PollingResult::InProgress)
                }
                Err(e) => Err(e),
            }
        }
    })
}

/// Waits until a bucket is deleted.
pub fn delete_bucket_wait_handler<G>(
    client: Arc<G>,
    project_id: impl Into<String>,
    region: impl Into<String>,
    bucket_name: impl Into<String>,
) -> AsyncActionHandler<GetBucketResponse>
where
    G: BucketGetter + ?Sized + 'static,
{
    let bucket = BucketRef::new(project_id, region, bucket_name);
    AsyncActionHandler::new(move || {
        let client = client.clone();
        let bucket = bucket.clone();
        async move {
            let fetched = client
                .get_bucket(&bucket.project_id, &bucket.region, &bucket.bucket_name)
                .await;
            match fetched {
                Ok(_) => Ok(PollingResult::InProgress),
                Err(e) if e.is_not_found() => Ok(PollingResult::Completed(None)),
                Err(e) if crate::is_transient(&e) => Ok(PollingResult::InProgress),
                Err(e) => Err(e),
            }
        }
    })
}
