// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health and metrics handlers
//!
//! `/ready` and `/alive` never look at the model cache.

use crate::api::{ApiError, AppState};
use crate::embeddings::{parse_authorization, HubCredential};
use crate::monitoring::METRICS_CONTENT_TYPE;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadyResponse {
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AliveResponse {
    pub alive: bool,
}

pub async fn ready_handler() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}

pub async fn alive_handler() -> Json<AliveResponse> {
    Json(AliveResponse { alive: true })
}

/// Prometheus text exposition of the server's registry
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::InternalError(format!("{:#}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        body,
    ))
}

/// Hub credential carried by the `Authorization` header, if any
pub fn credential_from_headers(headers: &HeaderMap) -> Option<HubCredential> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    parse_authorization(value)
}
