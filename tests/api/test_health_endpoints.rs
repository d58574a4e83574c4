// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Probe, CORS and server lifecycle tests

use super::support::*;
use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use vector_serve::api::ApiServer;
use vector_serve::embeddings::FixedModelLoader;

#[cfg(test)]
mod health_endpoint_tests {
    use super::*;

    /// Probes do not depend on the cache: nothing pre-warmed, multi-model off
    #[tokio::test]
    async fn test_probes_with_empty_cache() {
        let app = setup_app(FixedModelLoader::new(DIMENSION), false, &[]).await;
        assert!(app.state.cache().is_empty().await);

        let (status, body) = send(&app.router, get("/ready", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ready": true }));

        let (status, body) = send(&app.router, get("/alive", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "alive": true }));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = default_app().await;
        let request = Request::builder()
            .method(Method::GET)
            .uri("/alive")
            .header(header::ORIGIN, "https://example.com")
            .body(Body::empty())
            .unwrap();

        let response = tower::util::ServiceExt::oneshot(app.router.clone(), request)
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    /// The real server answers on an ephemeral port and shuts down cleanly
    #[tokio::test]
    async fn test_server_serves_and_shuts_down() {
        let app = default_app().await;
        let server = ApiServer::new("127.0.0.1:0".parse().unwrap(), app.state.clone())
            .await
            .unwrap();
        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /alive HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains(r#"{"alive":true}"#));

        server.shutdown().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
