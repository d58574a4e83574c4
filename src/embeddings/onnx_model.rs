// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs sentence-transformer models exported to ONNX through ONNX Runtime.
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Tokenization with truncation at the model's sequence limit
//! - Batch inference with padding to the longest sequence in the batch
//! - Attention-masked mean pooling, optional L2 normalization
//! - Output dimension detected from the model instead of assumed
//! - `token_type_ids` fed only to graphs that declare it (BERT does, MPNet and
//!   RoBERTa exports do not)

use super::{l2_normalize, EmbeddingModel};
use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Axis};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Value;
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Sequence limit used when neither the model config nor the tokenizer names one
pub const FALLBACK_MAX_SEQ_LENGTH: usize = 256;

const TOKEN_TYPE_IDS: &str = "token_type_ids";

/// The subset of `sentence_bert_config.json` we read
#[derive(Debug, Deserialize)]
struct SentenceBertConfig {
    max_seq_length: Option<usize>,
}

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// The ONNX session needs exclusive access per run, so it sits behind a
/// `Mutex`; concurrent `encode` calls on one model are serialized.
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session
    session: Mutex<Session>,

    /// Tokenizer configured to truncate at `max_length`
    tokenizer: Tokenizer,

    /// Canonical model name (e.g., "sentence-transformers/all-MiniLM-L6-v2")
    model_name: String,

    /// Hidden size of the pooled output
    dimension: usize,

    /// Maximum sequence length in tokens
    max_length: usize,

    /// Whether the graph declares a `token_type_ids` input
    token_types: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("token_types", &self.token_types)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads a model from disk. Blocking; call from the blocking pool.
    ///
    /// # Arguments
    /// - `model_path`: ONNX model file
    /// - `tokenizer_path`: `tokenizer.json`
    /// - `sentence_config_path`: optional `sentence_bert_config.json`, read for `max_seq_length`
    /// - `intra_threads`: ONNX Runtime intra-op thread count
    ///
    /// # Errors
    /// Returns error if a file is missing or invalid, ONNX Runtime cannot
    /// create a session, or the model does not output `[batch, seq, hidden]`.
    pub fn load(
        model_name: impl Into<String>,
        model_path: &Path,
        tokenizer_path: &Path,
        sentence_config_path: Option<&Path>,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("🚀 Initializing ONNX embedding model {}", model_name);

        // Try CUDA first, fall back to CPU if unavailable
        let cuda_result = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .context("Failed to set CUDA execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path);

        let mut session = match cuda_result {
            Ok(s) => {
                info!("✅ CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {}", e);
                warn!("   Falling back to CPU execution provider");
                Session::builder()
                    .context("Failed to create session builder")?
                    .with_execution_providers([CPUExecutionProvider::default().build()])
                    .context("Failed to set CPU execution provider")?
                    .with_optimization_level(GraphOptimizationLevel::Level3)
                    .context("Failed to set optimization level")?
                    .with_intra_threads(intra_threads)
                    .context("Failed to set intra threads")?
                    .commit_from_file(model_path)
                    .with_context(|| {
                        format!("Failed to load ONNX model from {}", model_path.display())
                    })?
            }
        };

        let input_names: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        debug!("Model inputs: {:?}", input_names);
        let token_types = declares_token_type_ids(&input_names);

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        let max_length = resolve_max_length(sentence_config_path, &tokenizer)?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let dimension = probe_dimension(&mut session, &tokenizer, token_types)?;

        info!(
            "✅ ONNX embedding model {} loaded ({} dimensions, max {} tokens)",
            model_name, dimension, max_length
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_name,
            dimension,
            max_length,
            token_types,
        })
    }
}

impl EmbeddingModel for OnnxEmbeddingModel {
    /// Tokenizes all texts, pads to the longest sequence and runs one batch
    /// inference followed by masked mean pooling.
    fn encode(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids_batch = Vec::with_capacity(texts.len() * max_len);
        let mut attention_mask_batch = Vec::with_capacity(texts.len() * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let padding_needed = max_len - ids.len();

            input_ids_batch.extend(ids.iter().map(|&id| id as i64));
            input_ids_batch.extend(std::iter::repeat(0i64).take(padding_needed));
            attention_mask_batch.extend(mask.iter().map(|&m| m as i64));
            attention_mask_batch.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        let pooling_mask = attention_mask_batch.clone();

        let input_ids_array = Array2::from_shape_vec((texts.len(), max_len), input_ids_batch)
            .context("Failed to create batch input_ids array")?;
        let attention_mask_array =
            Array2::from_shape_vec((texts.len(), max_len), attention_mask_batch)
                .context("Failed to create batch attention_mask array")?;
        let inputs = model_inputs(input_ids_array, attention_mask_array, self.token_types)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session.run(inputs)?;

        // Index [0]: output names differ between exports
        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch_idx in 0..texts.len() {
            let token_states = output_array.index_axis(Axis(0), batch_idx); // [seq_len, hidden]
            let mask = &pooling_mask[batch_idx * max_len..(batch_idx + 1) * max_len];

            let mut pooled = mean_pool(
                token_states.shape()[0],
                token_states.shape()[1],
                |i, j| token_states[[i, j]],
                mask,
            );

            if pooled.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    batch_idx,
                    pooled.len(),
                    self.dimension
                );
            }
            if normalize {
                l2_normalize(&mut pooled);
            }
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }

    fn max_sequence_length(&self) -> usize {
        self.max_length
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }
}

/// Sequence limit from `sentence_bert_config.json`, then the tokenizer's own
/// truncation settings, then [`FALLBACK_MAX_SEQ_LENGTH`]
fn resolve_max_length(sentence_config_path: Option<&Path>, tokenizer: &Tokenizer) -> Result<usize> {
    if let Some(path) = sentence_config_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: SentenceBertConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if let Some(max) = config.max_seq_length {
            return Ok(max);
        }
    }

    Ok(tokenizer
        .get_truncation()
        .map(|t| t.max_length)
        .unwrap_or(FALLBACK_MAX_SEQ_LENGTH))
}

/// Runs one validation inference and reads the hidden size from the output
fn probe_dimension(session: &mut Session, tokenizer: &Tokenizer, token_types: bool) -> Result<usize> {
    let encoding = tokenizer
        .encode("validation test", true)
        .map_err(|e| anyhow!("Tokenizer validation failed: {}", e))?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    let seq_len = input_ids.len();

    let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask)
        .context("Failed to create attention_mask array")?;

    let outputs = session.run(model_inputs(input_ids_array, attention_mask_array, token_types)?)?;

    let output_tensor = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;
    let shape = output_tensor.shape();

    // Token-level output: [batch, seq_len, hidden_dim]
    if shape.len() != 3 || shape[2] == 0 {
        anyhow::bail!(
            "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden])",
            shape
        );
    }
    Ok(shape[2])
}

fn declares_token_type_ids<S: AsRef<str>>(input_names: &[S]) -> bool {
    input_names.iter().any(|name| name.as_ref() == TOKEN_TYPE_IDS)
}

/// Named session inputs; all-zero `token_type_ids` are added when requested
fn model_inputs(
    input_ids: Array2<i64>,
    attention_mask: Array2<i64>,
    token_types: bool,
) -> Result<Vec<(&'static str, SessionInputValue<'static>)>> {
    let shape = input_ids.dim();
    let mut inputs: Vec<(&'static str, SessionInputValue<'static>)> = vec![
        ("input_ids", Value::from_array(input_ids)?.into()),
        ("attention_mask", Value::from_array(attention_mask)?.into()),
    ];
    if token_types {
        inputs.push((
            TOKEN_TYPE_IDS,
            Value::from_array(Array2::<i64>::zeros(shape))?.into(),
        ));
    }
    Ok(inputs)
}

/// Averages token states over the positions where `mask` is non-zero
fn mean_pool(
    seq_len: usize,
    hidden_dim: usize,
    value_at: impl Fn(usize, usize) -> f32,
    mask: &[i64],
) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for (i, &m) in mask.iter().enumerate().take(seq_len) {
        let mask_value = m as f32;
        sum_mask += mask_value;
        for (j, slot) in pooled.iter_mut().enumerate() {
            *slot += value_at(i, j) * mask_value;
        }
    }

    for val in &mut pooled {
        *val /= sum_mask.max(1e-9);
    }
    pooled
}
