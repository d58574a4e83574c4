// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model cache tests
//!
//! Lazy loading, the multi-model policy, credential passthrough, and
//! idempotence under concurrent loads of the same model.

use std::sync::Arc;
use std::time::Duration;
use vector_serve::embeddings::{FixedModelLoader, HubCredential, ModelCache, ModelId};
use vector_serve::ServeError;

fn id(name: &str) -> ModelId {
    ModelId::canonicalize(name)
}

#[cfg(test)]
mod model_cache_tests {
    use super::*;

    /// Two concurrent requests for an unseen model share one load
    #[tokio::test]
    async fn test_concurrent_loads_leave_one_entry() {
        let loader = Arc::new(FixedModelLoader::new(8).with_load_delay(Duration::from_millis(50)));
        let cache = ModelCache::new(loader.clone(), true);
        let model = id("org/fresh-model");

        let (first, second) = tokio::join!(
            cache.get_model(&model, None),
            cache.get_model(&model, None)
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(cache.len().await, 1);
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_many_spawned_requests_share_one_load() {
        let loader = Arc::new(FixedModelLoader::new(8).with_load_delay(Duration::from_millis(20)));
        let cache = Arc::new(ModelCache::new(loader.clone(), true));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_model(&id("racy-model"), None).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(cache.cached_models().await, vec![id("racy-model")]);
        assert_eq!(loader.load_count(), 1);
    }

    /// With multi-model disabled only pre-warmed models are served
    #[tokio::test]
    async fn test_multi_model_disabled_serves_only_prewarmed() {
        let loader = Arc::new(FixedModelLoader::new(8));
        let cache = ModelCache::new(loader.clone(), false);
        cache
            .prewarm(&[id("all-MiniLM-L6-v2")], loader.clone())
            .await
            .unwrap();

        assert!(cache
            .get_model(&id("sentence-transformers/all-MiniLM-L6-v2"), None)
            .await
            .is_ok());

        match cache.get_model(&id("other-model"), None).await {
            Err(ServeError::ModelUnavailable { model, cause }) => {
                assert_eq!(model, "sentence-transformers/other-model");
                assert!(cause.contains("MULTI_MODEL"));
            }
            Err(other) => panic!("expected ModelUnavailable, got {:?}", other),
            Ok(_) => panic!("expected ModelUnavailable"),
        }
        assert_eq!(loader.load_count(), 1);
    }

    /// A credential is needed for the first load only
    #[tokio::test]
    async fn test_credential_is_not_needed_once_cached() {
        let loader = Arc::new(FixedModelLoader::new(8).requiring_credential("hf_good"));
        let cache = ModelCache::new(loader.clone(), true);
        let model = id("org/gated-model");

        let without = cache.get_model(&model, None).await;
        assert!(matches!(without, Err(ServeError::ModelUnavailable { .. })));

        let credential = HubCredential::new("hf_good");
        assert!(cache.get_model(&model, Some(&credential)).await.is_ok());

        assert!(cache.get_model(&model, None).await.is_ok());
        assert_eq!(loader.load_count(), 2);
    }

    /// Failed loads are retried by every later request
    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let loader = Arc::new(FixedModelLoader::new(8).failing_for("org/broken"));
        let cache = ModelCache::new(loader.clone(), true);
        let model = id("org/broken");

        for _ in 0..2 {
            let err = cache.get_model(&model, None).await.err().unwrap();
            assert!(err.to_string().starts_with("Unable to load org/broken -- "));
        }

        assert!(!cache.contains(&model).await);
        assert_eq!(loader.load_count(), 2);
    }

    /// One failing pre-warm model aborts startup without installing the rest
    #[tokio::test]
    async fn test_prewarm_failure_is_fatal() {
        let loader = Arc::new(FixedModelLoader::new(8).failing_for("org/missing"));
        let cache = ModelCache::new(loader.clone(), true);

        let result = cache
            .prewarm(&[id("org/present"), id("org/missing")], loader)
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cached_models_are_sorted() {
        let cache = ModelCache::new(Arc::new(FixedModelLoader::new(4)), true);
        for name in ["zeta/model", "alpha/model", "mid-model"] {
            cache.get_model(&id(name), None).await.unwrap();
        }

        assert_eq!(
            cache.cached_models().await,
            vec![
                id("alpha/model"),
                id("sentence-transformers/mid-model"),
                id("zeta/model")
            ]
        );
    }
}
