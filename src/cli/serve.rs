// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::{ApiServer, AppState};
use crate::config::ServeConfig;
use crate::embeddings::{HubModelLoader, ModelCache};
use crate::monitoring::ServeMetrics;
use crate::version;
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Pre-warms the cache, then serves until Ctrl-C
pub async fn run(config: ServeConfig) -> Result<()> {
    info!("Starting {}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));
    info!(
        "multi_model={} batch_size={} chunking={} (size {}, overlap {})",
        config.multi_model,
        config.batch_size,
        config.chunking,
        config.chunk_size,
        config.chunk_overlap
    );

    let metrics = Arc::new(ServeMetrics::new()?);
    let loader = Arc::new(HubModelLoader::new(config.hub_config()));
    let cache = Arc::new(ModelCache::new(loader, config.multi_model).with_metrics(metrics.clone()));

    let prewarm_loader = Arc::new(HubModelLoader::new(config.prewarm_hub_config()));
    cache.prewarm(&config.prewarm_ids(), prewarm_loader).await?;

    let state = AppState::new(
        cache,
        config.dispatch_config()?,
        metrics,
        config.default_model.clone(),
    )?;
    let server = ApiServer::new(config.listen_addr, state).await?;
    info!("✅ Ready on http://{}", server.local_addr());

    signal::ctrl_c().await?;
    info!("Received Ctrl-C, shutting down");
    server.shutdown().await;

    Ok(())
}
