// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::DerivationError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid page.")]
    InvalidPage,
    #[error("No {0} matches the given query.")]
    NotFound(&'static str),
    /// The path did not name a valid object id.
    #[error("Not found.")]
    RouteNotFound,
    /// Missing campaign on the line-item CSV export. Reported as 400, unlike
    /// the other lookups.
    #[error("Campaign not found")]
    CampaignNotFound,
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired => StatusCode::FORBIDDEN,
            ApiError::MissingCredentials
            | ApiError::InvalidCredentials
            | ApiError::CampaignNotFound
            | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidPage | ApiError::NotFound(_) | ApiError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DerivationError> for ApiError {
    fn from(e: DerivationError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MissingCredentials
            | ApiError::InvalidCredentials
            | ApiError::CampaignNotFound => json!({ "message": self.to_string() }),
            ApiError::Validation { field, message } => {
                let mut errors = serde_json::Map::new();
                errors.insert(field.to_string(), json!([message]));
                serde_json::Value::Object(errors)
            }
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                json!({ "detail": "Internal server error." })
            }
            _ => json!({ "detail": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
