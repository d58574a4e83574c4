// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Read-only model information (sequence limit and dimensionality)

use super::{HubCredential, ModelCache, ModelId};
use crate::errors::ServeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Canonical model identifier
    pub model: String,
    pub max_seq_len: usize,
    pub embedding_dimension: usize,
}

/// Reports model properties through the same cache path as embedding requests
pub struct InfoResolver {
    cache: Arc<ModelCache>,
}

impl InfoResolver {
    pub fn new(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }

    pub async fn info(
        &self,
        model_name: &str,
        credential: Option<&HubCredential>,
    ) -> Result<ModelInfo, ServeError> {
        let model_id = ModelId::canonicalize(model_name);
        let model = self.cache.get_model(&model_id, credential).await?;
        debug!("Info requested for {}", model_id);

        Ok(ModelInfo {
            model: model_id.to_string(),
            max_seq_len: model.max_sequence_length(),
            embedding_dimension: model.embedding_dimension(),
        })
    }
}
