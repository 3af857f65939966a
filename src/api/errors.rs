// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::validation::ValidationError;
use crate::embeddings::SimilarityError;

/// Uniform failure envelope: `{"Message": ["..."]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(rename = "Message")]
    pub message: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    MissingArgument(String),
    InvalidRequest(String),
    Validation(ValidationError),
    Similarity(SimilarityError),
    Model(String),
}

impl ApiError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::MissingArgument(_) => "missing_argument",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Validation(ValidationError::Type(_)) => "type_error",
            ApiError::Validation(ValidationError::Value(_)) => "value_error",
            ApiError::Similarity(_) => "similarity_error",
            ApiError::Model(_) => "model_error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: vec![self.to_string()],
        }
    }

    /// Every failure inside a handler is reported to the client as a 400.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingArgument(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Validation(_)
            | ApiError::Similarity(_)
            | ApiError::Model(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingArgument(name) => write!(
                f,
                "Missing required parameter '{}' in the JSON body or the query string",
                name
            ),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Validation(err) => write!(f, "{}", err),
            ApiError::Similarity(err) => write!(f, "{}", err),
            ApiError::Model(msg) => write!(f, "Model invocation failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<SimilarityError> for ApiError {
    fn from(err: SimilarityError) -> Self {
        ApiError::Similarity(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Request rejected ({}): {}", self.error_type(), self);
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
