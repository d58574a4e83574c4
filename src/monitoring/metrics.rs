// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prometheus metrics for the embedding server
//!
//! The only series kept here is `http_requested_model`, incremented once for
//! every successful model lookup, labelled with the canonical model name.

use crate::embeddings::ModelId;
use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Content type of the Prometheus text exposition format
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub struct ServeMetrics {
    registry: Registry,
    requested_models: IntCounterVec,
}

impl ServeMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let requested_models = IntCounterVec::new(
            Opts::new(
                "http_requested_model",
                "Number of times a certain model has been requested.",
            ),
            &["model_name"],
        )
        .context("Failed to create http_requested_model counter")?;

        registry
            .register(Box::new(requested_models.clone()))
            .context("Failed to register http_requested_model counter")?;

        Ok(Self {
            registry,
            requested_models,
        })
    }

    /// Called by the model cache after every successful `get_model`
    pub fn record_model_request(&self, model: &ModelId) {
        self.requested_models
            .with_label_values(&[model.as_str()])
            .inc();
    }

    pub fn requested_count(&self, model: &ModelId) -> u64 {
        self.requested_models
            .with_label_values(&[model.as_str()])
            .get()
    }

    /// Renders every registered series in the text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
    }
}

impl std::fmt::Debug for ServeMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeMetrics").finish_non_exhaustive()
    }
}
