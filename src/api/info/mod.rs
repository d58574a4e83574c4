// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model info API Module
//!
//! GET /v1/info?model_name=...: sequence limit and vector size of a model,
//! loading it first if needed.

pub mod handler;
pub mod request;

pub use handler::info_handler;
pub use request::InfoQuery;
