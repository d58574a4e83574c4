// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model identifier canonicalization tests

use vector_serve::embeddings::{ModelId, DEFAULT_ORG};

#[cfg(test)]
mod model_id_tests {
    use super::*;

    #[test]
    fn test_canonicalize_is_idempotent() {
        let names = [
            "all-MiniLM-L6-v2",
            "sentence-transformers/all-MiniLM-L6-v2",
            "BAAI/bge-small-en-v1.5",
            "org/nested/name",
            "",
        ];

        for name in names {
            let once = ModelId::canonicalize(name);
            let twice = ModelId::canonicalize(once.as_str());
            assert_eq!(once, twice, "{:?}", name);
            assert!(once.as_str().contains('/'));
        }
    }

    #[test]
    fn test_bare_names_use_default_org() {
        let id = ModelId::from("multi-qa-MiniLM-L6-cos-v1");
        assert_eq!(id.org(), DEFAULT_ORG);
        assert_eq!(id.to_string(), "sentence-transformers/multi-qa-MiniLM-L6-cos-v1");
    }
}
