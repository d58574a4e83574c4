// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request body for POST /v1/embeddings

use crate::api::ApiError;
use crate::embeddings::EmbeddingBatch;
use serde::{Deserialize, Serialize};

/// Request body for POST /v1/embeddings
///
/// # Example
/// ```json
/// {
///   "input": ["Hello world", "Another text"],
///   "model": "all-MiniLM-L6-v2",
///   "normalize": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsRequest {
    /// Texts to embed, at least one
    pub input: Vec<String>,

    /// Model name, canonical or bare; the server default when absent
    #[serde(default)]
    pub model: Option<String>,

    /// L2-normalize every returned vector
    #[serde(default)]
    pub normalize: bool,
}

impl EmbeddingsRequest {
    /// Validates the request
    ///
    /// # Validation Rules
    /// 1. **input**: Must contain at least 1 item
    ///
    /// Empty strings inside `input` are allowed; they produce no chunks. The
    /// model name is not checked here; an unusable one fails to load.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.input.is_empty() {
            return Err(ApiError::ValidationError {
                field: "input".to_string(),
                message: "input must contain at least 1 item".to_string(),
            });
        }

        Ok(())
    }

    /// Converts into a dispatcher batch, filling in `default_model`
    pub fn into_batch(self, default_model: &str) -> EmbeddingBatch {
        EmbeddingBatch {
            input: self.input,
            model: self
                .model
                .unwrap_or_else(|| default_model.to_string()),
            normalize: self.normalize,
        }
    }
}
