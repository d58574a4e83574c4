// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response body for POST /v1/embeddings

use crate::embeddings::{Embedding, EmbeddingOutput};
use serde::{Deserialize, Serialize};

/// Response body for POST /v1/embeddings
///
/// `index` is the position in the flattened chunk sequence, so a chunked
/// input contributes several consecutive items.
///
/// # Example
/// ```json
/// {
///   "data": [{ "embedding": [0.1, 0.2], "index": 0 }],
///   "model": "sentence-transformers/all-MiniLM-L6-v2"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingsResponse {
    pub data: Vec<Embedding>,

    /// Canonical identifier of the model used
    pub model: String,
}

impl From<EmbeddingOutput> for EmbeddingsResponse {
    fn from(output: EmbeddingOutput) -> Self {
        Self {
            data: output.data,
            model: output.model.to_string(),
        }
    }
}
