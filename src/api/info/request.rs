// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

/// Query string of GET /v1/info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoQuery {
    pub model_name: String,
}
