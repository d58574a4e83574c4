// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding models, model cache and request dispatch
//!
//! A loaded model is reached only through the [`EmbeddingModel`] capability.
//! [`ModelLoader`] turns a canonical identifier (plus an optional hub
//! credential) into such a model; [`ModelCache`] owns every loaded model for
//! the lifetime of the process, and [`EmbeddingDispatcher`] chunks, batches
//! and encodes request input against it.

pub mod batcher;
pub mod chunker;
pub mod credential;
pub mod dispatcher;
pub mod fixed;
pub mod hub_loader;
pub mod info;
pub mod model_id;
pub mod model_manager;
pub mod onnx_model;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use batcher::{chunk_list, DEFAULT_BATCH_SIZE};
pub use chunker::{Chunk, TextChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use credential::{parse_authorization, HubCredential};
pub use dispatcher::{DispatchConfig, Embedding, EmbeddingBatch, EmbeddingDispatcher, EmbeddingOutput};
pub use fixed::{FixedModelLoader, FixedVectorModel};
pub use hub_loader::{HubLoaderConfig, HubModelLoader, ModelFiles};
pub use info::{InfoResolver, ModelInfo};
pub use model_id::{ModelId, DEFAULT_ORG};
pub use model_manager::ModelCache;
pub use onnx_model::OnnxEmbeddingModel;

/// A loaded embedding model
///
/// `encode` is blocking (CPU/accelerator bound); async callers run it on the
/// blocking pool.
pub trait EmbeddingModel: Send + Sync {
    /// Encodes `texts` into one vector each, in input order
    fn encode(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>>;

    /// Longest token sequence the model accepts before truncation
    fn max_sequence_length(&self) -> usize;

    /// Length of every vector returned by `encode`
    fn embedding_dimension(&self) -> usize;
}

/// Produces loaded models on a cache miss
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Loads `model`, forwarding `credential` to the remote hub when present
    async fn load(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<Arc<dyn EmbeddingModel>>;
}

/// Scales `vector` to unit L2 norm (zero vectors are left untouched)
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
