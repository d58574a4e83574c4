// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Every field can be given as a flag or through its environment variable.
//! `.env` files are read before parsing (see `main.rs`).

use crate::embeddings::{
    DispatchConfig, HubLoaderConfig, ModelId, TextChunker, DEFAULT_BATCH_SIZE,
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
use crate::errors::ServeError;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_PREWARM_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServeConfig {
    /// Address the HTTP server binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Allow loading models that were not pre-warmed
    #[arg(
        long,
        env = "MULTI_MODEL",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub multi_model: bool,

    /// Texts per encode call
    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Resolve pre-warm models from the local cache only
    #[arg(
        long,
        env = "LOCAL_FILES_ONLY",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub local_files_only: bool,

    /// Model hub cache directory
    #[arg(long, env = "MODEL_CACHE_DIR", default_value = "./models")]
    pub cache_dir: PathBuf,

    /// Model used when a request names none
    #[arg(long, env = "DEFAULT_MODEL", default_value = DEFAULT_MODEL)]
    pub default_model: String,

    /// Comma-separated models loaded at startup
    #[arg(
        long = "models-to-cache",
        env = "MODELS_TO_CACHE",
        value_delimiter = ',',
        default_value = DEFAULT_PREWARM_MODEL
    )]
    pub prewarm_models: Vec<String>,

    /// Maximum chunk length in characters
    #[arg(long, env = "CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "CHUNK_OVERLAP", default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Split long inputs into overlapping chunks before embedding
    #[arg(
        long = "enable-chunking",
        env = "ENABLE_CHUNKING",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub chunking: bool,

    /// ONNX Runtime intra-op threads per model
    #[arg(long = "ort-intra-threads", env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            multi_model: true,
            batch_size: DEFAULT_BATCH_SIZE,
            local_files_only: true,
            cache_dir: PathBuf::from("./models"),
            default_model: DEFAULT_MODEL.to_string(),
            prewarm_models: vec![DEFAULT_PREWARM_MODEL.to_string()],
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            chunking: true,
            intra_threads: 4,
        }
    }
}

impl ServeConfig {
    /// Rejects values that would stall or break dispatch
    pub fn validate(&self) -> Result<(), ServeError> {
        if self.batch_size == 0 {
            return Err(ServeError::InvalidRequest(
                "BATCH_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.chunking {
            TextChunker::new(self.chunk_size, self.chunk_overlap)?;
        }
        if self.default_model.trim().is_empty() {
            return Err(ServeError::InvalidRequest(
                "DEFAULT_MODEL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dispatch_config(&self) -> Result<DispatchConfig, ServeError> {
        let chunker = if self.chunking {
            Some(TextChunker::new(self.chunk_size, self.chunk_overlap)?)
        } else {
            None
        };
        Ok(DispatchConfig {
            batch_size: self.batch_size,
            chunker,
        })
    }

    /// Canonical identifiers of the pre-warm models, blanks skipped
    pub fn prewarm_ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> = self
            .prewarm_models
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(ModelId::canonicalize)
            .collect();
        ids.dedup();
        ids
    }

    /// Loader settings for on-demand loads (always allowed to download)
    pub fn hub_config(&self) -> HubLoaderConfig {
        HubLoaderConfig {
            cache_dir: self.cache_dir.clone(),
            local_files_only: false,
            intra_threads: self.intra_threads,
        }
    }

    /// Loader settings for pre-warm loads
    pub fn prewarm_hub_config(&self) -> HubLoaderConfig {
        HubLoaderConfig {
            local_files_only: self.local_files_only,
            ..self.hub_config()
        }
    }
}
