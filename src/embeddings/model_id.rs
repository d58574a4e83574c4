// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Canonical model identifiers
//!
//! Every cache lookup and every load is keyed by `<org>/<name>`. Names without
//! an organization are placed under the default sentence-transformers org.

use serde::Serialize;
use std::fmt;

/// Organization prepended to identifiers that do not name one
pub const DEFAULT_ORG: &str = "sentence-transformers";

/// A model identifier in canonical `<org>/<name>` form
///
/// The only way to build one is [`ModelId::canonicalize`], so two values are
/// equal exactly when their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Rewrites `name` into canonical form
    ///
    /// # Example
    /// ```
    /// use vector_serve::embeddings::ModelId;
    ///
    /// assert_eq!(ModelId::canonicalize("all-MiniLM-L6-v2").as_str(),
    ///            "sentence-transformers/all-MiniLM-L6-v2");
    /// assert_eq!(ModelId::canonicalize("BAAI/bge-small-en").as_str(), "BAAI/bge-small-en");
    /// ```
    pub fn canonicalize(name: &str) -> Self {
        if name.contains('/') {
            ModelId(name.to_string())
        } else {
            ModelId(format!("{}/{}", DEFAULT_ORG, name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Organization part (everything before the first `/`)
    pub fn org(&self) -> &str {
        self.0.split_once('/').map(|(org, _)| org).unwrap_or_default()
    }

    /// Name part (everything after the first `/`)
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, name)| name).unwrap_or(&self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(name: &str) -> Self {
        ModelId::canonicalize(name)
    }
}
