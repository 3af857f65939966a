// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod version;

pub use api::{create_app, ApiError, AppState, ValidationError};
pub use config::{ModelBackend, ModelConfig, ServerConfig, ServiceConfig};
pub use embeddings::{Embedding, HashEncoder, OnnxEmbeddingModel, SentenceEncoder};
