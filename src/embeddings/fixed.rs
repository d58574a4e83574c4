// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic in-process models for tests and benchmarks
//!
//! [`FixedVectorModel`] derives each vector from a hash of the text, so the
//! same text always yields the same embedding without any model files.
//! [`FixedModelLoader`] hands such models to the cache and can be configured
//! to fail, to require a credential, or to load slowly.

use super::{l2_normalize, EmbeddingModel, HubCredential, ModelId, ModelLoader};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Model whose vectors are a pure function of the input text
#[derive(Debug)]
pub struct FixedVectorModel {
    dimension: usize,
    max_sequence_length: usize,
    fail_marker: Option<String>,
    batches: Mutex<Vec<usize>>,
}

impl FixedVectorModel {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_sequence_length: 256,
            fail_marker: None,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_max_sequence_length(mut self, max_sequence_length: usize) -> Self {
        self.max_sequence_length = max_sequence_length;
        self
    }

    /// Makes `encode` fail for any batch containing a text with `marker`
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    /// Sizes of every batch passed to `encode`, in call order
    pub fn recorded_batches(&self) -> Vec<usize> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }

    /// The vector `encode` returns for `text`
    pub fn vector_for(&self, text: &str, normalize: bool) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut current_seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            // Linear congruential step, mixed with the position
            current_seed =
                (current_seed.wrapping_mul(1664525).wrapping_add(1013904223)) ^ (i as u64);
            let value = (current_seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        if normalize {
            l2_normalize(&mut embedding);
        }
        embedding
    }
}

impl EmbeddingModel for FixedVectorModel {
    fn encode(&self, texts: &[String], normalize: bool) -> Result<Vec<Vec<f32>>> {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(texts.len());
        }

        if let Some(marker) = &self.fail_marker {
            if texts.iter().any(|text| text.contains(marker.as_str())) {
                return Err(anyhow!("encode rejected input containing {:?}", marker));
            }
        }

        Ok(texts
            .iter()
            .map(|text| self.vector_for(text, normalize))
            .collect())
    }

    fn max_sequence_length(&self) -> usize {
        self.max_sequence_length
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }
}

/// Loader producing [`FixedVectorModel`]s
#[derive(Debug)]
pub struct FixedModelLoader {
    dimension: usize,
    unavailable: HashSet<ModelId>,
    required_token: Option<String>,
    load_delay: Duration,
    loads: AtomicUsize,
}

impl FixedModelLoader {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            unavailable: HashSet::new(),
            required_token: None,
            load_delay: Duration::ZERO,
            loads: AtomicUsize::new(0),
        }
    }

    /// Loads of `model` fail as if the hub were unreachable
    pub fn failing_for(mut self, model: &str) -> Self {
        self.unavailable.insert(ModelId::canonicalize(model));
        self
    }

    /// Loads fail unless this exact token is supplied
    pub fn requiring_credential(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    /// Every load sleeps for `delay` first
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Number of load attempts so far, successful or not
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for FixedModelLoader {
    async fn load(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<Arc<dyn EmbeddingModel>> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        if self.unavailable.contains(model) {
            return Err(anyhow!("Repository {} could not be reached", model));
        }

        if let Some(required) = &self.required_token {
            match credential {
                Some(credential) if credential.expose() == required => {}
                Some(_) => return Err(anyhow!("Invalid credentials for {}", model)),
                None => return Err(anyhow!("{} is a gated repository", model)),
            }
        }

        Ok(Arc::new(FixedVectorModel::new(self.dimension)))
    }
}
