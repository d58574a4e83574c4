// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// src/monitoring/mod.rs - Metrics exposed on /metrics

pub mod metrics;

pub use metrics::{ServeMetrics, METRICS_CONTENT_TYPE};
