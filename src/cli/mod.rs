// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ModelBackend, ServiceConfig};

/// Sentence embedding HTTP service
#[derive(Parser, Debug, Default)]
#[command(name = "sentence-embedding-node")]
#[command(version)]
#[command(about = "Serves sentence embeddings and similarity scores over HTTP", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "EMBED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind, e.g. 0.0.0.0:5000
    #[arg(long)]
    pub listen_addr: Option<String>,

    /// Encoder backend
    #[arg(long, value_enum)]
    pub backend: Option<ModelBackend>,

    /// Local ONNX model file (requires --tokenizer-path)
    #[arg(long, requires = "tokenizer_path")]
    pub model_path: Option<PathBuf>,

    /// Local tokenizer.json (requires --model-path)
    #[arg(long, requires = "model_path")]
    pub tokenizer_path: Option<PathBuf>,

    /// Hugging Face repository to download the model from
    #[arg(long)]
    pub model_repo: Option<String>,
}

impl Cli {
    /// Builds the effective configuration: file, then environment, then flags.
    pub fn resolve_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        config.apply_env()?;
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut ServiceConfig) {
        if let Some(addr) = &self.listen_addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(backend) = self.backend {
            config.model.backend = backend;
        }
        if let Some(path) = &self.model_path {
            config.model.model_path = Some(path.clone());
        }
        if let Some(path) = &self.tokenizer_path {
            config.model.tokenizer_path = Some(path.clone());
        }
        if let Some(repo) = &self.model_repo {
            config.model.repo_id = repo.clone();
        }
    }
}
