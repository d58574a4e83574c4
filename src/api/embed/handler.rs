// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings HTTP handler

use crate::api::embed::{EmbeddingsRequest, EmbeddingsResponse};
use crate::api::{credential_from_headers, ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::HeaderMap, Json};
use tracing::debug;

/// POST /v1/embeddings handler
///
/// An `Authorization: Bearer hf_...` header is forwarded to the model hub if
/// the model has to be downloaded; other values are ignored.
///
/// # Errors
/// - 422 when the body is not a valid request or `input` is empty
/// - 400 with `Unable to load <model> -- <cause>` when the model cannot be served
/// - 500 when encoding fails
pub async fn embeddings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<EmbeddingsRequest>, JsonRejection>,
) -> Result<Json<EmbeddingsResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::ValidationError {
        field: "body".to_string(),
        message: rejection.body_text(),
    })?;
    request.validate()?;

    let credential = credential_from_headers(&headers);
    debug!(
        "Embedding {} inputs (credential supplied: {})",
        request.input.len(),
        credential.is_some()
    );

    let batch = request.into_batch(&state.default_model);
    let output = state.dispatcher.embed(batch, credential.as_ref()).await?;

    Ok(Json(output.into()))
}
