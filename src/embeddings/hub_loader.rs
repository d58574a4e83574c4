// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model hub loader
//!
//! Resolves a canonical identifier to ONNX model files on the Hugging Face hub
//! (or only in the local hub cache when `local_files_only` is set), then builds
//! an [`OnnxEmbeddingModel`] on the blocking pool.
//!
//! The credential is passed to the hub client for this download only; the
//! returned model holds no reference to it.

use super::{EmbeddingModel, HubCredential, ModelId, ModelLoader, OnnxEmbeddingModel};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use hf_hub::api::tokio::ApiBuilder;
use hf_hub::{Cache, Repo};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// ONNX exports tried in order
pub const ONNX_MODEL_FILES: [&str; 2] = ["onnx/model.onnx", "model.onnx"];
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const SENTENCE_CONFIG_FILE: &str = "sentence_bert_config.json";

#[derive(Debug, Clone)]
pub struct HubLoaderConfig {
    /// Local hub cache directory
    pub cache_dir: PathBuf,
    /// Never contact the hub; resolve files from `cache_dir` only
    pub local_files_only: bool,
    /// ONNX Runtime intra-op threads per model
    pub intra_threads: usize,
}

impl Default for HubLoaderConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./models"),
            local_files_only: false,
            intra_threads: 4,
        }
    }
}

/// Paths of the files making up one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub sentence_config_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HubModelLoader {
    config: HubLoaderConfig,
}

impl HubModelLoader {
    pub fn new(config: HubLoaderConfig) -> Self {
        Self { config }
    }

    /// Resolves the model's files, downloading them unless `local_files_only`
    pub async fn fetch(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<ModelFiles> {
        if self.config.local_files_only {
            self.fetch_local(model)
        } else {
            self.fetch_remote(model, credential).await
        }
    }

    fn fetch_local(&self, model: &ModelId) -> Result<ModelFiles> {
        let cache = Cache::new(self.config.cache_dir.clone());
        let repo = cache.repo(Repo::model(model.to_string()));

        let model_path = ONNX_MODEL_FILES
            .iter()
            .find_map(|file| repo.get(file))
            .with_context(|| {
                format!(
                    "No ONNX export of {} in local cache {} (local files only)",
                    model,
                    self.config.cache_dir.display()
                )
            })?;
        let tokenizer_path = repo.get(TOKENIZER_FILE).with_context(|| {
            format!("{} of {} not in local cache", TOKENIZER_FILE, model)
        })?;

        Ok(ModelFiles {
            model_path,
            tokenizer_path,
            sentence_config_path: repo.get(SENTENCE_CONFIG_FILE),
        })
    }

    async fn fetch_remote(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<ModelFiles> {
        let api = ApiBuilder::new()
            .with_cache_dir(self.config.cache_dir.clone())
            .with_token(credential.map(|c| c.expose().to_string()))
            .with_progress(false)
            .build()
            .context("Failed to create model hub client")?;
        let repo = api.model(model.to_string());

        let mut model_path = None;
        let mut last_error = None;
        for file in ONNX_MODEL_FILES {
            match repo.get(file).await {
                Ok(path) => {
                    model_path = Some(path);
                    break;
                }
                Err(e) => {
                    debug!("{} has no {}: {}", model, file, e);
                    last_error = Some(e);
                }
            }
        }
        let model_path = match (model_path, last_error) {
            (Some(path), _) => path,
            (None, Some(e)) => {
                return Err(anyhow!(e).context(format!("No ONNX export found for {}", model)))
            }
            (None, None) => anyhow::bail!("No ONNX export found for {}", model),
        };

        let tokenizer_path = repo
            .get(TOKENIZER_FILE)
            .await
            .with_context(|| format!("Failed to download {} for {}", TOKENIZER_FILE, model))?;
        let sentence_config_path = repo.get(SENTENCE_CONFIG_FILE).await.ok();

        Ok(ModelFiles {
            model_path,
            tokenizer_path,
            sentence_config_path,
        })
    }
}

#[async_trait]
impl ModelLoader for HubModelLoader {
    async fn load(
        &self,
        model: &ModelId,
        credential: Option<&HubCredential>,
    ) -> Result<Arc<dyn EmbeddingModel>> {
        let files = self.fetch(model, credential).await?;
        info!("Resolved {} to {}", model, files.model_path.display());

        let model_name = model.to_string();
        let intra_threads = self.config.intra_threads;
        let onnx = tokio::task::spawn_blocking(move || {
            OnnxEmbeddingModel::load(
                model_name,
                &files.model_path,
                &files.tokenizer_path,
                files.sentence_config_path.as_deref(),
                intra_threads,
            )
        })
        .await
        .context("Model load task failed")??;

        Ok(Arc::new(onnx))
    }
}
