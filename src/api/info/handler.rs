// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::info::InfoQuery;
use crate::api::{credential_from_headers, ApiError, AppState};
use crate::embeddings::ModelInfo;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

/// GET /v1/info handler
///
/// Goes through the same cache path as POST /v1/embeddings, so an unknown
/// model is loaded (and counted) here as well.
pub async fn info_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<InfoQuery>, QueryRejection>,
) -> Result<Json<ModelInfo>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::ValidationError {
        field: "model_name".to_string(),
        message: rejection.body_text(),
    })?;
    if query.model_name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: "model_name".to_string(),
            message: "model_name cannot be empty".to_string(),
        });
    }

    let credential = credential_from_headers(&headers);
    let info = state
        .info
        .info(&query.model_name, credential.as_ref())
        .await?;

    Ok(Json(info))
}
