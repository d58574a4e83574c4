// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the embedding core
//!
//! Three kinds of failure can abort a request:
//! - **InvalidRequest**: malformed batch or invalid configuration (never retried)
//! - **ModelUnavailable**: the requested model is not pre-warmed while multi-model
//!   loading is disabled, or the load attempt itself failed
//! - **InferenceFailure**: the loaded model's `encode` call failed
//!
//! All of them are converted to structured responses at the request boundary
//! (see `api::errors`). Nothing in the core retries.

use thiserror::Error;

/// Errors surfaced by the model cache and the embedding dispatcher
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServeError {
    /// Malformed batch or invalid configuration value
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model could not be served; `cause` carries the underlying error chain
    #[error("Unable to load {model} -- {cause}")]
    ModelUnavailable { model: String, cause: String },

    /// The model's `encode` call failed for one of the batches
    #[error("Inference failed for {model}: {reason}")]
    InferenceFailure { model: String, reason: String },
}

impl ServeError {
    /// Builds a `ModelUnavailable` keeping the full `anyhow` context chain
    pub fn model_unavailable(model: impl Into<String>, cause: &anyhow::Error) -> Self {
        ServeError::ModelUnavailable {
            model: model.into(),
            cause: format!("{:#}", cause),
        }
    }

    /// Builds an `InferenceFailure` keeping the full `anyhow` context chain
    pub fn inference_failure(model: impl Into<String>, cause: &anyhow::Error) -> Self {
        ServeError::InferenceFailure {
            model: model.into(),
            reason: format!("{:#}", cause),
        }
    }
}
