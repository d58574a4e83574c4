// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for router-level API tests

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`
use vector_serve::api::{create_router, AppState};
use vector_serve::embeddings::{DispatchConfig, FixedModelLoader, ModelCache, ModelId, TextChunker};
use vector_serve::ServeMetrics;

pub const DIMENSION: usize = 8;
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
pub const CANONICAL_DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub loader: Arc<FixedModelLoader>,
    pub metrics: Arc<ServeMetrics>,
}

/// Router over a cache pre-warmed with `prewarm`, chunking at 1000/200
pub async fn setup_app(loader: FixedModelLoader, multi_model: bool, prewarm: &[&str]) -> TestApp {
    let loader = Arc::new(loader);
    let metrics = Arc::new(ServeMetrics::new().unwrap());
    let cache = Arc::new(ModelCache::new(loader.clone(), multi_model).with_metrics(metrics.clone()));

    let prewarm: Vec<ModelId> = prewarm.iter().map(|name| ModelId::canonicalize(name)).collect();
    cache.prewarm(&prewarm, loader.clone()).await.unwrap();

    let dispatch = DispatchConfig {
        batch_size: 1000,
        chunker: Some(TextChunker::new(1000, 200).unwrap()),
    };
    let state = AppState::new(cache, dispatch, metrics.clone(), DEFAULT_MODEL).unwrap();

    TestApp {
        router: create_router(state.clone()),
        state,
        loader,
        metrics,
    }
}

/// Default app: multi-model enabled, default model pre-warmed
pub async fn default_app() -> TestApp {
    setup_app(FixedModelLoader::new(DIMENSION), true, &[DEFAULT_MODEL]).await
}

pub fn post_json(uri: &str, body: Value, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends `request` and returns the status and the body (as JSON when it is JSON)
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
