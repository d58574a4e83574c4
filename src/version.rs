// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for Vector Serve

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-chunked-embeddings-2026-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multi-model",
    "lazy-model-loading",
    "hub-credentials",
    "text-chunking",
    "batched-encoding",
    "onnx-runtime",
    "prometheus-metrics",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Vector Serve {} ({})", VERSION_NUMBER, BUILD_DATE)
}
