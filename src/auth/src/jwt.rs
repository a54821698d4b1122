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


//! Structural checks for JSON Web Tokens.

use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

/// Parses a compact-serialized JWT into its header and claims, without
/// verifying its signature.
///
/// The token must have three base64url segments, the first two must decode
/// to JSON objects. Expiration claims are not inspected.
pub(crate) fn parse(token: &str) -> Option<(Object, Object)> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    if signature.is_empty() {
        return None;
    }
    BASE64_URL_SAFE_NO_PAD.decode(signature).ok()?;
    Some((decode_object(header)?, decode_object(claims)?))
}

/// Returns `true` if `token` parses as a JWT.
///
/// This is the validity check used by the key flow. A token past its `exp`
/// claim is still considered valid here. The service rejects such a token
/// with `401 Unauthorized`, and the authorized transport then invalidates
/// the cached token and retries the request once with a new one.
pub(crate) fn is_valid(token: &str) -> bool {
    parse(token).is_some()
}

fn decode_object(segment: &str) -> Option<Object> {
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(segment).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
