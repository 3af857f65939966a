// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model acquisition
//!
//! Resolves the model and tokenizer files (local paths, or a download from
//! the Hugging Face hub) and builds the process-wide encoder handle once at
//! startup.

use crate::config::{ModelBackend, ModelConfig};
use crate::embeddings::onnx_model::OnnxModelOptions;
use crate::embeddings::{HashEncoder, OnnxEmbeddingModel, SentenceEncoder};
use anyhow::{Context, Result};
use hf_hub::api::tokio::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// On-disk locations of the ONNX graph and its tokenizer
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

/// Returns local files when configured, otherwise fetches them from
/// `repo_id` at `revision` (served from the hub cache when present).
pub async fn resolve_model_files(config: &ModelConfig) -> Result<ModelFiles> {
    if let (Some(model_path), Some(tokenizer_path)) = (&config.model_path, &config.tokenizer_path)
    {
        info!("Using local model files: {}", model_path.display());
        return Ok(ModelFiles {
            model_path: model_path.clone(),
            tokenizer_path: tokenizer_path.clone(),
        });
    }

    info!(
        "Fetching {} ({}) from the Hugging Face hub",
        config.repo_id, config.revision
    );

    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(dir) = &config.cache_dir {
        builder = builder.with_cache_dir(dir.clone());
    }
    let api = builder.build().context("Failed to initialize hub client")?;
    let repo = api.repo(Repo::with_revision(
        config.repo_id.clone(),
        RepoType::Model,
        config.revision.clone(),
    ));

    let model_path = repo
        .get(&config.model_file)
        .await
        .with_context(|| format!("Failed to fetch {} from {}", config.model_file, config.repo_id))?;
    let tokenizer_path = repo
        .get(&config.tokenizer_file)
        .await
        .with_context(|| {
            format!(
                "Failed to fetch {} from {}",
                config.tokenizer_file, config.repo_id
            )
        })?;

    Ok(ModelFiles {
        model_path,
        tokenizer_path,
    })
}

/// Builds the encoder selected by `config.backend`.
pub async fn load_encoder(config: &ModelConfig) -> Result<Arc<dyn SentenceEncoder>> {
    let encoder: Arc<dyn SentenceEncoder> = match config.backend {
        ModelBackend::Hash => {
            info!(
                "Using hash encoder ({} dimensions), embeddings carry no meaning",
                config.hash_dimension
            );
            Arc::new(HashEncoder::new(config.hash_dimension, config.normalize)?)
        }
        ModelBackend::Onnx => {
            let files = resolve_model_files(config).await?;
            let options = OnnxModelOptions {
                max_length: config.max_length,
                intra_threads: config.intra_threads,
                normalize: config.normalize,
            };
            let model = OnnxEmbeddingModel::new(
                config.name.clone(),
                files.model_path,
                files.tokenizer_path,
                options,
            )
            .await
            .with_context(|| format!("Failed to load embedding model {}", config.name))?;
            Arc::new(model)
        }
    };

    info!(
        "Embedding model ready: {} ({} dimensions)",
        encoder.model_name(),
        encoder.dimension()
    );
    Ok(encoder)
}
