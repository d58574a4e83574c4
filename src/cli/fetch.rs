// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::config::ServeConfig;
use crate::embeddings::{HubCredential, HubModelLoader};
use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Hub token for gated or private models
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hub_token: Option<String>,
}

/// Downloads every pre-warm model into the cache directory
///
/// Used while building images so that `LOCAL_FILES_ONLY` pre-warm loads
/// find their files.
pub async fn run(config: ServeConfig, args: FetchArgs) -> Result<()> {
    let models = config.prewarm_ids();
    if models.is_empty() {
        warn!("MODELS_TO_CACHE is empty, nothing to fetch");
        return Ok(());
    }

    let loader = HubModelLoader::new(config.hub_config());
    let credential = args.hub_token.map(HubCredential::new);

    for model in &models {
        info!("Fetching {}", model);
        let files = loader
            .fetch(model, credential.as_ref())
            .await
            .with_context(|| format!("Failed to fetch {}", model))?;
        info!("✓ {} -> {}", model, files.model_path.display());
    }

    info!(
        "Fetched {} models into {}",
        models.len(),
        config.cache_dir.display()
    );
    Ok(())
}
