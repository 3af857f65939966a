// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Layered as defaults, then an optional TOML file, then `EMBED_*`
//! environment variables, then command-line flags (see [`crate::cli`]).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Which encoder backs the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// ONNX sentence transformer run through ONNX Runtime
    Onnx,
    /// Deterministic hash vectors, no model download
    Hash,
}

impl std::str::FromStr for ModelBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "onnx" => Ok(ModelBackend::Onnx),
            "hash" => Ok(ModelBackend::Hash),
            other => anyhow::bail!("Unknown model backend '{}' (expected onnx or hash)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    /// Name reported on `/health`
    pub name: String,
    /// Hugging Face repository the model is fetched from
    pub repo_id: String,
    pub revision: String,
    /// File names inside the repository
    pub model_file: String,
    pub tokenizer_file: String,
    /// Local files; when both are set nothing is downloaded
    pub model_path: Option<PathBuf>,
    pub tokenizer_path: Option<PathBuf>,
    /// Download cache, hf-hub default when unset
    pub cache_dir: Option<PathBuf>,
    pub max_length: usize,
    pub intra_threads: usize,
    pub normalize: bool,
    pub hash_dimension: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Onnx,
            name: "all-MiniLM-L6-v2".to_string(),
            repo_id: DEFAULT_MODEL_REPO.to_string(),
            revision: "main".to_string(),
            model_file: "onnx/model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            model_path: None,
            tokenizer_path: None,
            cache_dir: None,
            max_length: 256,
            intra_threads: 4,
            normalize: true,
            hash_dimension: 384,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

impl ServiceConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `EMBED_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("EMBED_LISTEN_ADDR") {
            self.server.listen_addr = val;
        }
        if let Some(val) = lookup("EMBED_MODEL_BACKEND") {
            self.model.backend = val.parse()?;
        }
        if let Some(val) = lookup("EMBED_MODEL_REPO") {
            self.model.repo_id = val;
        }
        if let Some(val) = lookup("EMBED_MODEL_PATH") {
            self.model.model_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("EMBED_TOKENIZER_PATH") {
            self.model.tokenizer_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("EMBED_MAX_LENGTH") {
            self.model.max_length = val
                .parse()
                .with_context(|| format!("EMBED_MAX_LENGTH is not a number: {}", val))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.listen_addr.trim().is_empty() {
            anyhow::bail!("server.listen_addr must not be empty");
        }
        if self.model.max_length == 0 {
            anyhow::bail!("model.max_length must be greater than 0");
        }
        if self.model.hash_dimension == 0 {
            anyhow::bail!("model.hash_dimension must be greater than 0");
        }
        if self.model.model_path.is_some() != self.model.tokenizer_path.is_some() {
            anyhow::bail!("model.model_path and model.tokenizer_path must be set together");
        }
        Ok(())
    }
}
