// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Info resolver tests

use std::sync::Arc;
use vector_serve::embeddings::{
    FixedModelLoader, FixedVectorModel, InfoResolver, ModelCache, ModelId,
};
use vector_serve::{ServeError, ServeMetrics};

#[cfg(test)]
mod info_resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_model_properties() {
        let cache = Arc::new(ModelCache::new(Arc::new(FixedModelLoader::new(8)), false));
        cache
            .install(
                ModelId::canonicalize("all-MiniLM-L6-v2"),
                Arc::new(FixedVectorModel::new(384).with_max_sequence_length(512)),
            )
            .await;
        let resolver = InfoResolver::new(cache);

        let info = resolver.info("all-MiniLM-L6-v2", None).await.unwrap();

        assert_eq!(info.model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(info.max_seq_len, 512);
        assert_eq!(info.embedding_dimension, 384);
    }

    /// Unseen models are loaded through the cache, and counted
    #[tokio::test]
    async fn test_loads_unseen_model() {
        let metrics = Arc::new(ServeMetrics::new().unwrap());
        let loader = Arc::new(FixedModelLoader::new(32));
        let cache = Arc::new(ModelCache::new(loader.clone(), true).with_metrics(metrics.clone()));
        let resolver = InfoResolver::new(cache.clone());

        let info = resolver.info("BAAI/bge-small-en-v1.5", None).await.unwrap();

        assert_eq!(info.embedding_dimension, 32);
        assert!(cache.contains(&ModelId::canonicalize("BAAI/bge-small-en-v1.5")).await);
        assert_eq!(
            metrics.requested_count(&ModelId::canonicalize("BAAI/bge-small-en-v1.5")),
            1
        );
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_multi_model_disabled() {
        let cache = Arc::new(ModelCache::new(Arc::new(FixedModelLoader::new(8)), false));
        let resolver = InfoResolver::new(cache);

        let result = resolver.info("not-prewarmed", None).await;
        assert!(matches!(result, Err(ServeError::ModelUnavailable { .. })));
    }
}
