// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! GET /embeddings, POST /embeddings/bulk and POST /embeddings/similarity.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{bulk_embedding_handler, similarity_handler, single_embedding_handler};
pub use request::{BulkEmbeddingRequest, SimilarityRequest, SingleEmbeddingRequest};
pub use response::{BulkEmbeddingResponse, EmbeddingResponse, SimilarityResponse};
