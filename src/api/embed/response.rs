// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Success bodies for the embedding endpoints. Each carries exactly one key.

use serde::{Deserialize, Serialize};

use crate::embeddings::Embedding;

/// `{"embedding": [0.1, 0.2, ...]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResponse {
    pub embedding: Embedding,
}

/// `{"embeddings": [[0.1, ...], [0.3, ...]]}`, one entry per input sentence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkEmbeddingResponse {
    pub embeddings: Vec<Embedding>,
}

/// `{"similarity": 0.42}`, cosine distance in [0, 2]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResponse {
    pub similarity: f64,
}
