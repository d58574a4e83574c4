// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod monitoring;
pub mod version;

pub use api::{create_router, ApiServer, AppState};
pub use config::ServeConfig;
pub use embeddings::{
    EmbeddingDispatcher, EmbeddingModel, InfoResolver, ModelCache, ModelId, ModelLoader,
    TextChunker,
};
pub use errors::ServeError;
pub use monitoring::ServeMetrics;
