// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /metrics tests

use super::support::*;
use axum::http::{header, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use vector_serve::monitoring::METRICS_CONTENT_TYPE;

#[cfg(test)]
mod metrics_endpoint_tests {
    use super::*;

    /// Every successful model lookup is counted under the canonical name
    #[tokio::test]
    async fn test_requested_model_counter() {
        let app = default_app().await;

        for _ in 0..2 {
            let (status, _) = send(
                &app.router,
                post_json("/v1/embeddings", json!({ "input": ["count me"] }), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = send(&app.router, get("/v1/info?model_name=all-MiniLM-L6-v2", None)).await;
        assert_eq!(status, StatusCode::OK);

        let response = app.router.clone().oneshot(get("/metrics", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            METRICS_CONTENT_TYPE
        );

        let (_, body) = send(&app.router, get("/metrics", None)).await;
        let Value::String(text) = body else {
            panic!("metrics body should be plain text");
        };
        assert!(text.contains(&format!(
            "http_requested_model{{model_name=\"{}\"}} 3",
            CANONICAL_DEFAULT_MODEL
        )));
    }

    /// Refused lookups are not counted
    #[tokio::test]
    async fn test_failed_lookup_not_counted() {
        let app = setup_app(
            vector_serve::embeddings::FixedModelLoader::new(DIMENSION),
            false,
            &[],
        )
        .await;

        let (status, _) = send(
            &app.router,
            post_json("/v1/embeddings", json!({ "input": ["x"] }), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(
            app.metrics
                .requested_count(&vector_serve::ModelId::canonicalize(DEFAULT_MODEL)),
            0
        );
    }
}
