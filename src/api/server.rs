// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::embed::embeddings_handler;
use crate::api::handlers::{alive_handler, metrics_handler, ready_handler};
use crate::api::info::info_handler;
use crate::embeddings::{DispatchConfig, EmbeddingDispatcher, InfoResolver, ModelCache};
use crate::errors::ServeError;
use crate::monitoring::ServeMetrics;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<EmbeddingDispatcher>,
    pub info: Arc<InfoResolver>,
    pub metrics: Arc<ServeMetrics>,
    /// Model used when a request names none
    pub default_model: String,
}

impl AppState {
    /// Builds the dispatcher and info resolver over one shared cache
    pub fn new(
        cache: Arc<ModelCache>,
        dispatch: DispatchConfig,
        metrics: Arc<ServeMetrics>,
        default_model: impl Into<String>,
    ) -> Result<Self, ServeError> {
        let dispatcher = EmbeddingDispatcher::new(cache.clone(), dispatch)?;
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            info: Arc::new(InfoResolver::new(cache)),
            metrics,
            default_model: default_model.into(),
        })
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        self.dispatcher.cache()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/embeddings", post(embeddings_handler))
        .route("/v1/info", get(info_handler))
        .route("/v1/info/", get(info_handler))
        .route("/ready", get(ready_handler))
        .route("/alive", get(alive_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server running on a background task until [`ApiServer::shutdown`]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Binds `listen_addr` (port 0 picks a free port) and starts serving
    pub async fn new(listen_addr: SocketAddr, state: AppState) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(listen_addr).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = create_router(state);

        let handle = tokio::spawn(async move {
            let serve_future = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = serve_future.await {
                error!("HTTP server error: {}", e);
            }
        });

        info!("API server listening on {}", addr);

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("API server on {} stopped", self.addr);
    }
}
