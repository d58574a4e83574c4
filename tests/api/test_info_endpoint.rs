// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /v1/info tests

use super::support::*;
use axum::http::StatusCode;
use vector_serve::embeddings::FixedModelLoader;

#[cfg(test)]
mod info_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_info_for_prewarmed_model() {
        let app = default_app().await;

        let (status, body) = send(&app.router, get("/v1/info?model_name=all-MiniLM-L6-v2", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], CANONICAL_DEFAULT_MODEL);
        assert_eq!(body["max_seq_len"], 256);
        assert_eq!(body["embedding_dimension"], DIMENSION);
    }

    #[tokio::test]
    async fn test_trailing_slash_route() {
        let app = default_app().await;

        let (status, body) = send(
            &app.router,
            get("/v1/info/?model_name=sentence-transformers/all-MiniLM-L6-v2", None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], CANONICAL_DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_missing_model_name_is_rejected() {
        let app = default_app().await;

        let (status, body) = send(&app.router, get("/v1/info", None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Validation error for model_name"));
    }

    #[tokio::test]
    async fn test_unavailable_model_is_400() {
        let app = setup_app(FixedModelLoader::new(DIMENSION), false, &[DEFAULT_MODEL]).await;

        let (status, body) = send(&app.router, get("/v1/info?model_name=other", None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Unable to load sentence-transformers/other -- "));
    }

    #[tokio::test]
    async fn test_info_uses_hub_token() {
        let app = setup_app(
            FixedModelLoader::new(DIMENSION).requiring_credential("hf_info"),
            true,
            &[],
        )
        .await;

        let (status, _) = send(&app.router, get("/v1/info?model_name=org/gated", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app.router,
            get("/v1/info?model_name=org/gated", Some("Bearer hf_info")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "org/gated");
    }
}
