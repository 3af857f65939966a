// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding models
//!
//! Everything the HTTP layer needs from a model goes through the
//! [`SentenceEncoder`] trait, so the loaded handle can be swapped for a
//! deterministic encoder or a mock in tests.

pub mod hash_encoder;
pub mod model_loader;
pub mod onnx_model;
pub mod similarity;

use anyhow::Result;
use async_trait::async_trait;

pub use hash_encoder::HashEncoder;
pub use model_loader::{load_encoder, resolve_model_files, ModelFiles};
pub use onnx_model::OnnxEmbeddingModel;
pub use similarity::{cosine_distance, split_pair, SimilarityError};

/// One embedding vector per input sentence
pub type Embedding = Vec<f32>;

/// Model invoker: turns an ordered list of sentences into embeddings.
///
/// Implementations return exactly one vector per input, in input order, all
/// with length [`SentenceEncoder::dimension`]. They do no validation or
/// caching of their own.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    /// Name reported in logs and on `/health`
    fn model_name(&self) -> &str;

    /// Output dimension, fixed for the lifetime of the encoder
    fn dimension(&self) -> usize;

    async fn encode(&self, sentences: &[String]) -> Result<Vec<Embedding>>;
}
