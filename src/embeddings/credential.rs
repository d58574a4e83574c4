// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model hub credentials taken from the `Authorization` header
//!
//! A credential is only ever forwarded to a load call. It is never stored in
//! the model cache and never logged.

use std::fmt;

/// Prefix that marks a bearer token as a model hub access token
pub const HUB_TOKEN_PREFIX: &str = "hf_";

/// Bearer-style access token for the remote model hub
#[derive(Clone, PartialEq, Eq)]
pub struct HubCredential(String);

impl HubCredential {
    pub fn new(token: impl Into<String>) -> Self {
        HubCredential(token.into())
    }

    /// Returns the raw token for handing to the hub client
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HubCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HubCredential(***)")
    }
}

/// Extracts a hub credential from an `Authorization` header value
///
/// The text after the last `Bearer ` is used as the token. Tokens that do not
/// carry the hub prefix are treated as absent, so callers can send unrelated
/// bearer tokens without them being forwarded.
pub fn parse_authorization(header: Option<&str>) -> Option<HubCredential> {
    let token = header?.rsplit("Bearer ").next()?;
    if token.starts_with(HUB_TOKEN_PREFIX) {
        Some(HubCredential::new(token))
    } else {
        None
    }
}
