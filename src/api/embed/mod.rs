// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! POST /v1/embeddings: chunk, batch and encode a list of texts with the
//! requested (or default) model.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embeddings_handler;
pub use request::EmbeddingsRequest;
pub use response::EmbeddingsResponse;
