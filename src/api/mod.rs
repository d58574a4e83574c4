// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod handlers;
pub mod info;
pub mod server;

pub use embed::{embeddings_handler, EmbeddingsRequest, EmbeddingsResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{
    alive_handler, credential_from_headers, metrics_handler, ready_handler, AliveResponse,
    ReadyResponse,
};
pub use info::{info_handler, InfoQuery};
pub use server::{create_router, ApiServer, AppState};
