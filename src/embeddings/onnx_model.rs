// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence transformer exported to ONNX (all-MiniLM-L6-v2 by default)
//! through ONNX Runtime.
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Tokenization with truncation to `max_length`
//! - One batched inference per request
//! - Mean pooling over token embeddings, weighted by the attention mask
//! - Output dimension detected from the model at load time

use super::{Embedding, SentenceEncoder};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayViewD, Axis};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Runtime knobs for [`OnnxEmbeddingModel`]
#[derive(Debug, Clone)]
pub struct OnnxModelOptions {
    /// Maximum tokens per sentence; longer input is truncated
    pub max_length: usize,
    /// ONNX Runtime intra-op thread count
    pub intra_threads: usize,
    /// L2-normalize pooled embeddings
    pub normalize: bool,
}

impl Default for OnnxModelOptions {
    fn default() -> Self {
        Self {
            max_length: 256,
            intra_threads: 4,
            normalize: true,
        }
    }
}

/// Token ids, attention mask and token type ids for one padded batch
struct BatchInputs {
    batch_size: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// `Session::run` needs `&mut`, so the session sits behind a mutex. The
/// handle itself is cheap to clone and safe to share across requests.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("normalize", &self.normalize)
            .finish_non_exhaustive()
    }
}

fn build_session(
    model_path: &Path,
    provider: ExecutionProviderDispatch,
    intra_threads: usize,
) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([provider])
        .context("Failed to set execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
}

impl OnnxEmbeddingModel {
    /// Loads the model and tokenizer, then runs a probe inference to learn
    /// the output dimension.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - Model output is neither `[batch, seq_len, hidden]` nor `[batch, hidden]`
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "all-MiniLM-L6-v2",
    ///     "./models/all-MiniLM-L6-v2/model.onnx",
    ///     "./models/all-MiniLM-L6-v2/tokenizer.json",
    ///     OnnxModelOptions::default(),
    /// ).await?;
    /// ```
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        options: OnnxModelOptions,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }
        if options.max_length == 0 {
            anyhow::bail!("max_length must be greater than 0");
        }

        info!("Initializing ONNX embedding model {}", model_name);
        let session = match build_session(
            model_path,
            CUDAExecutionProvider::default().build(),
            options.intra_threads,
        ) {
            Ok(s) => {
                info!("CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("CUDA execution provider failed: {:#}", e);
                warn!("Falling back to CPU execution provider");
                build_session(
                    model_path,
                    CPUExecutionProvider::default().build(),
                    options.intra_threads,
                )?
            }
        };

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let mut model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: 0,
            normalize: options.normalize,
        };

        let probe = model
            .embed_batch(&["validation test".to_string()])
            .context("Probe inference failed")?;
        model.dimension = probe
            .first()
            .map(Vec::len)
            .filter(|&d| d > 0)
            .context("Probe inference returned no embedding")?;

        info!(
            "ONNX embedding model {} loaded ({} dimensions)",
            model.model_name, model.dimension
        );

        Ok(model)
    }

    fn tokenize(&self, texts: &[String]) -> Result<BatchInputs> {
        let encodings = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let seq_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let capacity = texts.len() * seq_len;
        let mut inputs = BatchInputs {
            batch_size: texts.len(),
            seq_len,
            input_ids: Vec::with_capacity(capacity),
            attention_mask: Vec::with_capacity(capacity),
            token_type_ids: Vec::with_capacity(capacity),
        };

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let padding = seq_len - ids.len();

            inputs.input_ids.extend(ids.iter().map(|&id| id as i64));
            inputs
                .attention_mask
                .extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            inputs
                .token_type_ids
                .extend(encoding.get_type_ids().iter().map(|&t| t as i64));

            inputs.input_ids.extend(std::iter::repeat(0i64).take(padding));
            inputs.attention_mask.extend(std::iter::repeat(0i64).take(padding));
            inputs.token_type_ids.extend(std::iter::repeat(0i64).take(padding));
        }

        Ok(inputs)
    }

    /// Embeds a batch with a single inference call.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs = self.tokenize(texts)?;
        let shape = (inputs.batch_size, inputs.seq_len);
        debug!(
            "Running ONNX inference: batch={} seq_len={}",
            inputs.batch_size, inputs.seq_len
        );

        let input_ids = Array2::from_shape_vec(shape, inputs.input_ids)
            .context("Failed to create input_ids array")?;
        let attention_mask = Array2::from_shape_vec(shape, inputs.attention_mask.clone())
            .context("Failed to create attention_mask array")?;
        let token_type_ids = Array2::from_shape_vec(shape, inputs.token_type_ids)
            .context("Failed to create token_type_ids array")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids)?,
            "attention_mask" => Value::from_array(attention_mask)?,
            "token_type_ids" => Value::from_array(token_type_ids)?
        ])?;

        // Output names differ between exports, the first output is the hidden state
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let mut embeddings = pool(output, &inputs.attention_mask, inputs.batch_size, inputs.seq_len)?;
        if self.normalize {
            embeddings.iter_mut().for_each(|e| l2_normalize(e));
        }

        if self.dimension > 0 {
            for (i, emb) in embeddings.iter().enumerate() {
                if emb.len() != self.dimension {
                    anyhow::bail!(
                        "Unexpected embedding dimension at index {}: {} (expected {})",
                        i,
                        emb.len(),
                        self.dimension
                    );
                }
            }
        }

        Ok(embeddings)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Reduces the model output to one vector per batch item.
///
/// `[batch, seq_len, hidden]` outputs are mean pooled over non-padding
/// tokens; `[batch, hidden]` outputs are already sentence embeddings.
fn pool(
    output: ArrayViewD<'_, f32>,
    attention_mask: &[i64],
    batch_size: usize,
    seq_len: usize,
) -> Result<Vec<Embedding>> {
    let shape = output.shape().to_vec();
    if shape.first() != Some(&batch_size) {
        anyhow::bail!(
            "Model output batch mismatch: {:?} (expected batch {})",
            shape,
            batch_size
        );
    }

    match shape.len() {
        2 => Ok((0..batch_size)
            .map(|b| output.index_axis(Axis(0), b).iter().copied().collect())
            .collect()),
        3 => {
            let hidden_dim = shape[2];
            let mut embeddings = Vec::with_capacity(batch_size);

            for b in 0..batch_size {
                let item = output.index_axis(Axis(0), b); // [seq_len, hidden_dim]
                let mask = &attention_mask[b * seq_len..(b + 1) * seq_len];

                let mut pooled = vec![0.0f32; hidden_dim];
                let mut sum_mask = 0.0f32;
                for (i, &m) in mask.iter().enumerate().take(shape[1]) {
                    let mask_value = m as f32;
                    sum_mask += mask_value;
                    for (j, slot) in pooled.iter_mut().enumerate() {
                        *slot += item[[i, j]] * mask_value;
                    }
                }

                for val in &mut pooled {
                    *val /= sum_mask.max(1e-9);
                }
                embeddings.push(pooled);
            }

            Ok(embeddings)
        }
        _ => anyhow::bail!(
            "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden] or [batch, hidden])",
            shape
        ),
    }
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

#[async_trait]
impl SentenceEncoder for OnnxEmbeddingModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, sentences: &[String]) -> Result<Vec<Embedding>> {
        // Inference holds the session lock; keep it off the async workers.
        let model = self.clone();
        let sentences = sentences.to_vec();
        tokio::task::spawn_blocking(move || model.embed_batch(&sentences))
            .await
            .map_err(|e| anyhow!("Embedding task failed: {}", e))?
    }
}
