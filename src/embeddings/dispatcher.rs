// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding dispatch
//!
//! Turns one request batch into indexed embeddings:
//! 1. canonicalize the requested model and fetch it from the [`ModelCache`]
//! 2. chunk every input in order and flatten the chunks
//! 3. split the flattened texts into `batch_size` batches
//! 4. encode each batch on the blocking pool, appending results in order
//! 5. index the results by their position in the flattened sequence
//!
//! With chunking, an output index is a position among chunks, not among the
//! caller's inputs. Any failure aborts the whole request.

use super::{
    chunk_list, Chunk, EmbeddingModel, HubCredential, ModelCache, ModelId, TextChunker,
    DEFAULT_BATCH_SIZE,
};
use crate::errors::ServeError;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Texts per `encode` call
    pub batch_size: usize,
    /// Chunker applied to every input; `None` embeds each input whole
    pub chunker: Option<TextChunker>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            chunker: Some(TextChunker::default()),
        }
    }
}

/// One request batch
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub input: Vec<String>,
    /// Requested model, canonical or bare
    pub model: String,
    pub normalize: bool,
}

/// One output vector and its position in the flattened output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub embedding: Vec<f32>,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub data: Vec<Embedding>,
    /// Canonical identifier of the model used
    pub model: ModelId,
}

pub struct EmbeddingDispatcher {
    cache: Arc<ModelCache>,
    config: DispatchConfig,
}

impl EmbeddingDispatcher {
    /// # Errors
    /// Returns `InvalidRequest` if `batch_size` is zero.
    pub fn new(cache: Arc<ModelCache>, config: DispatchConfig) -> Result<Self, ServeError> {
        if config.batch_size == 0 {
            return Err(ServeError::InvalidRequest(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(Self { cache, config })
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Embeds `batch`, forwarding `credential` if the model must be loaded
    pub async fn embed(
        &self,
        batch: EmbeddingBatch,
        credential: Option<&HubCredential>,
    ) -> Result<EmbeddingOutput, ServeError> {
        if batch.input.is_empty() {
            return Err(ServeError::InvalidRequest(
                "input must contain at least 1 item".to_string(),
            ));
        }
        info!(batch_predict_len = batch.input.len(), "Embedding request");

        let model_id = ModelId::canonicalize(&batch.model);
        let model = self.cache.get_model(&model_id, credential).await?;

        let chunks = self.flatten(&batch.input);
        let texts: Vec<String> = chunks.into_iter().map(|chunk| chunk.text).collect();

        let batches = chunk_list(&texts, self.config.batch_size)?;
        let num_batches = batches.len();
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

        for (idx, texts) in batches.into_iter().enumerate() {
            info!("Batch {} / {}", idx, num_batches);
            let encoded = encode_blocking(model.clone(), texts.to_vec(), batch.normalize)
                .await
                .map_err(|e| ServeError::inference_failure(model_id.as_str(), &e))?;

            if encoded.len() != texts.len() {
                return Err(ServeError::InferenceFailure {
                    model: model_id.to_string(),
                    reason: format!(
                        "model returned {} vectors for {} texts",
                        encoded.len(),
                        texts.len()
                    ),
                });
            }
            vectors.extend(encoded);
        }
        info!("Completed {} batches", num_batches);

        let data = vectors
            .into_iter()
            .enumerate()
            .map(|(index, embedding)| Embedding { embedding, index })
            .collect();

        Ok(EmbeddingOutput {
            data,
            model: model_id,
        })
    }

    /// Chunks (or passes through) every input, preserving input order
    pub fn flatten(&self, input: &[String]) -> Vec<Chunk> {
        match &self.config.chunker {
            Some(chunker) => chunker.chunk_all(input),
            None => input
                .iter()
                .enumerate()
                .map(|(source_index, text)| Chunk {
                    source_index,
                    text: text.clone(),
                })
                .collect(),
        }
    }
}

async fn encode_blocking(
    model: Arc<dyn EmbeddingModel>,
    texts: Vec<String>,
    normalize: bool,
) -> anyhow::Result<Vec<Vec<f32>>> {
    tokio::task::spawn_blocking(move || model.encode(&texts, normalize))
        .await
        .map_err(|e| anyhow!("encode task failed: {}", e))?
}
