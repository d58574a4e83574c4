// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding Model Cache
//!
//! Process-wide mapping from canonical model identifier to a loaded model.
//!
//! - Pre-warm models are loaded in parallel at startup via [`ModelCache::prewarm`]
//! - Unseen identifiers are loaded lazily when multi-model loading is enabled
//! - At most one load per identifier runs at a time; concurrent requests for
//!   the same identifier wait for it and then share the result
//! - Failed loads are not remembered, the next request retries
//! - Entries are never evicted
//!
//! A hub credential supplied with a request is handed to that request's load
//! only. Once a model is cached, later requests are served without one.

use super::{EmbeddingModel, HubCredential, ModelId, ModelLoader};
use crate::errors::ServeError;
use crate::monitoring::ServeMetrics;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Refusal reason when multi-model loading is disabled
pub const MULTI_MODEL_DISABLED: &str = "Must enable multi-model via MULTI_MODEL env var";

/// Cache of loaded embedding models
///
/// # Example
/// ```ignore
/// let cache = ModelCache::new(Arc::new(loader), true);
/// cache.prewarm(&[ModelId::canonicalize("all-MiniLM-L6-v2")], prewarm_loader).await?;
/// let model = cache.get_model(&ModelId::canonicalize("all-MiniLM-L6-v2"), None).await?;
/// ```
pub struct ModelCache {
    /// Ready models by canonical identifier
    models: RwLock<HashMap<ModelId, Arc<dyn EmbeddingModel>>>,

    /// One gate per identifier with a load in flight
    loading: Mutex<HashMap<ModelId, Arc<Mutex<()>>>>,

    /// Loader used on cache misses
    loader: Arc<dyn ModelLoader>,

    /// Whether identifiers outside the pre-warmed set may be loaded
    multi_model: bool,

    metrics: Option<Arc<ServeMetrics>>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>, multi_model: bool) -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
            loader,
            multi_model,
            metrics: None,
        }
    }

    /// Attaches the request counter incremented by every successful lookup
    pub fn with_metrics(mut self, metrics: Arc<ServeMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Loads every pre-warm model in parallel and installs it
    ///
    /// `loader` may differ from the on-demand loader (pre-warm loads are
    /// normally restricted to local files).
    ///
    /// # Errors
    /// Fails if any pre-warm model fails to load; nothing is installed then.
    pub async fn prewarm(&self, models: &[ModelId], loader: Arc<dyn ModelLoader>) -> Result<()> {
        if models.is_empty() {
            return Ok(());
        }

        info!("Loading {} pre-warm embedding models in parallel", models.len());

        let mut load_tasks = Vec::new();
        for model in models {
            let model = model.clone();
            let loader = loader.clone();
            load_tasks.push(tokio::spawn(async move {
                info!("Loading embedding model: {}", model);
                let result = loader.load(&model, None).await;
                (model, result)
            }));
        }

        let mut loaded = Vec::with_capacity(load_tasks.len());
        for task in load_tasks {
            let (model, result) = task.await.context("Pre-warm load task failed")?;
            match result {
                Ok(handle) => {
                    info!(
                        "✓ Loaded model: {} ({} dimensions, max {} tokens)",
                        model,
                        handle.embedding_dimension(),
                        handle.max_sequence_length()
                    );
                    loaded.push((model, handle));
                }
                Err(e) => {
                    error!("✗ Failed to load model {}: {:#}", model, e);
                    return Err(e.context(format!("Failed to pre-warm model {}", model)));
                }
            }
        }

        for (model, handle) in loaded {
            self.install(model, handle).await;
        }

        info!("Model cache initialized: {} models ready", self.len().await);
        Ok(())
    }

    /// Installs an already-loaded model; an existing entry is kept
    pub async fn install(&self, model: ModelId, handle: Arc<dyn EmbeddingModel>) {
        self.models.write().await.entry(model).or_insert(handle);
    }

    /// Returns the model for `model`, loading it on first use
    ///
    /// # Errors
    /// `ModelUnavailable` when the model is not cached and multi-model loading
    /// is disabled, or when the load attempt fails.
    pub async fn get_model(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<Arc<dyn EmbeddingModel>, ServeError> {
        let handle = self.resolve(model, credential).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_model_request(model);
        }
        Ok(handle)
    }

    async fn resolve(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<Arc<dyn EmbeddingModel>, ServeError> {
        if let Some(handle) = self.lookup(model).await {
            return Ok(handle);
        }

        if !self.multi_model {
            return Err(ServeError::ModelUnavailable {
                model: model.to_string(),
                cause: MULTI_MODEL_DISABLED.to_string(),
            });
        }

        let gate = {
            let mut loading = self.loading.lock().await;
            loading.entry(model.clone()).or_default().clone()
        };
        let _load_guard = gate.lock().await;

        // A load that held the gate before us may have completed
        if let Some(handle) = self.lookup(model).await {
            return Ok(handle);
        }

        debug!("Model: {} not in cache", model);
        let result = match self.loader.load(model, credential).await {
            Ok(handle) => {
                let handle = self
                    .models
                    .write()
                    .await
                    .entry(model.clone())
                    .or_insert(handle)
                    .clone();
                info!("Added model: {} to cache", model);
                Ok(handle)
            }
            Err(e) => {
                if credential.is_none() {
                    warn!("No credential provided for model: {}", model);
                }
                error!("Failed to load model {}: {:#}", model, e);
                Err(ServeError::model_unavailable(model.as_str(), &e))
            }
        };

        // Ready models are found by lookup from here on
        self.release_gate(model, &gate).await;
        result
    }

    async fn release_gate(&self, model: &ModelId, gate: &Arc<Mutex<()>>) {
        let mut loading = self.loading.lock().await;
        if loading
            .get(model)
            .is_some_and(|current| Arc::ptr_eq(current, gate))
        {
            loading.remove(model);
        }
    }

    async fn lookup(&self, model: &ModelId) -> Option<Arc<dyn EmbeddingModel>> {
        self.models.read().await.get(model).cloned()
    }

    pub async fn contains(&self, model: &ModelId) -> bool {
        self.models.read().await.contains_key(model)
    }

    /// Canonical identifiers of every ready model, sorted
    pub async fn cached_models(&self) -> Vec<ModelId> {
        let mut models: Vec<ModelId> = self.models.read().await.keys().cloned().collect();
        models.sort();
        models
    }

    pub async fn len(&self) -> usize {
        self.models.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.models.read().await.is_empty()
    }

    pub fn multi_model(&self) -> bool {
        self.multi_model
    }
}
