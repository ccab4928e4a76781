// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Request extractors that report failures as `ApiError`.

use crate::error::ApiError;
use axum::Form;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use serde_json::{Map, Value};

/// Numeric id segment of the path. Anything other than digits is a 404, the
/// same as a route that does not exist.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i64);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::RouteNotFound)?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ApiError::RouteNotFound);
        }
        raw.parse::<i64>()
            .map(PathId)
            .map_err(|_| ApiError::RouteNotFound)
    }
}

/// Submitted fields as a JSON object, whether the client sent JSON, an
/// urlencoded form or `multipart/form-data`. Form values arrive as strings.
/// An empty body is an empty object.
#[derive(Debug, Clone)]
pub struct Fields(pub Value);

impl Fields {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

fn malformed(e: impl std::fmt::Display) -> ApiError {
    ApiError::Validation {
        field: "non_field_errors",
        message: format!("Malformed request - {}", e),
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequest<S> for Fields {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(malformed)?;
            let map: Map<String, Value> = pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            return Ok(Fields(Value::Object(map)));
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(malformed)?;
            let mut map = Map::new();
            while let Some(field) = multipart.next_field().await.map_err(malformed)? {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let text = field.text().await.map_err(malformed)?;
                map.insert(name, Value::String(text));
            }
            return Ok(Fields(Value::Object(map)));
        }

        let body = Bytes::from_request(req, state).await.map_err(malformed)?;
        if body.is_empty() {
            return Ok(Fields(Value::Object(Map::new())));
        }
        serde_json::from_slice(&body)
            .map(Fields)
            .map_err(|e| ApiError::Validation {
                field: "non_field_errors",
                message: format!("JSON parse error - {}", e),
            })
    }
}
