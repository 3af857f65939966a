// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request types for the embedding endpoints
//!
//! Fields are kept as raw JSON values: shape checks belong to the validator,
//! so a wrong type surfaces as a type-class validation error rather than a
//! parsing failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, RequestArgs};

/// GET /embeddings
///
/// ```json
/// { "sentence": "The fox jumped higher this time." }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SingleEmbeddingRequest {
    pub sentence: Value,
}

/// POST /embeddings/bulk
///
/// ```json
/// { "sentences": ["This is my first string.", "This is my second string."] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkEmbeddingRequest {
    pub sentences: Value,
}

/// POST /embeddings/similarity
///
/// ```json
/// { "sentence_1": "The dog went over the moon", "sentence_2": "How are you doing" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityRequest {
    pub sentence_1: Value,
    pub sentence_2: Value,
}

impl SingleEmbeddingRequest {
    /// The single sentence wrapped into a one-element list
    pub fn into_input(self) -> Value {
        Value::Array(vec![self.sentence])
    }
}

impl BulkEmbeddingRequest {
    pub fn into_input(self) -> Value {
        self.sentences
    }
}

impl SimilarityRequest {
    /// Both sentences as a two-element list, in field order
    pub fn into_input(self) -> Value {
        Value::Array(vec![self.sentence_1, self.sentence_2])
    }
}

impl TryFrom<RequestArgs> for SingleEmbeddingRequest {
    type Error = ApiError;

    fn try_from(mut args: RequestArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            sentence: args.required("sentence")?,
        })
    }
}

impl TryFrom<RequestArgs> for BulkEmbeddingRequest {
    type Error = ApiError;

    fn try_from(mut args: RequestArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            sentences: args.required_list("sentences")?,
        })
    }
}

impl TryFrom<RequestArgs> for SimilarityRequest {
    type Error = ApiError;

    fn try_from(mut args: RequestArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            sentence_1: args.required("sentence_1")?,
            sentence_2: args.required("sentence_2")?,
        })
    }
}
