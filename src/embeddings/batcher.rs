// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-size batching of an ordered sequence

use crate::errors::ServeError;

/// Default number of texts handed to the model per `encode` call
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Splits `items` into consecutive runs of `batch_size`; the last may be shorter
///
/// Concatenating the returned batches reconstructs `items` exactly.
///
/// # Errors
/// Returns `InvalidRequest` when `batch_size` is zero.
pub fn chunk_list<T>(items: &[T], batch_size: usize) -> Result<Vec<&[T]>, ServeError> {
    if batch_size == 0 {
        return Err(ServeError::InvalidRequest(
            "batch_size must be greater than 0".to_string(),
        ));
    }
    Ok(items.chunks(batch_size).collect())
}
