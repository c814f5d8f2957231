//! Memoized chat client handles.
//!
//! Handles are keyed by (role, temperature) and built lazily through a
//! [`ChatClientFactory`]. Capacity is bounded as a safety valve; the key
//! space is tiny in practice, so eviction should never trigger.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::provider::{ChatClientFactory, ModelClientHandle};
use crate::config::{CacheConfig, EvictionKind};
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    role: String,
    temperature_bits: u32,
}

impl ClientKey {
    fn new(role: &str, temperature: f32) -> Self {
        // -0.0 and 0.0 must share an entry.
        let temperature = if temperature == 0.0 { 0.0 } else { temperature };
        Self {
            role: role.to_string(),
            temperature_bits: temperature.to_bits(),
        }
    }
}

/// Process-wide cache of chat client handles.
///
/// Concurrent first requests for the same key are coalesced, so a handle is
/// constructed at most once per key while it stays cached. Construction
/// failures are returned to the caller and never cached.
pub struct ModelClientCache {
    entries: Cache<ClientKey, ModelClientHandle>,
    factory: Arc<dyn ChatClientFactory>,
}

impl ModelClientCache {
    /// Create a cache with the configured capacity and eviction policy.
    pub fn new(factory: Arc<dyn ChatClientFactory>, config: &CacheConfig) -> Self {
        let policy = match config.eviction {
            EvictionKind::Lru => EvictionPolicy::lru(),
            EvictionKind::TinyLfu => EvictionPolicy::tiny_lfu(),
        };
        Self {
            entries: Cache::builder()
                .max_capacity(config.capacity)
                .eviction_policy(policy)
                .build(),
            factory,
        }
    }

    /// Create a cache with default settings around `factory`.
    pub fn with_factory(factory: impl ChatClientFactory + 'static) -> Self {
        Self::new(Arc::new(factory), &CacheConfig::default())
    }

    /// Return the handle for `(role, temperature)`, constructing it on first use.
    pub fn get_client(
        &self,
        role: &str,
        temperature: f32,
    ) -> Result<ModelClientHandle, PipelineError> {
        let key = ClientKey::new(role, temperature);
        self.entries
            .try_get_with(key, || {
                tracing::debug!("Client cache miss for role '{role}' at temperature {temperature}");
                self.factory.create(role, temperature)
            })
            .map_err(|shared| {
                Arc::try_unwrap(shared).unwrap_or_else(|e| PipelineError::model(e.to_string()))
            })
    }

    /// Number of cached handles.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{ChatClient, ChatMessage, ChatResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NamedClient;

    #[async_trait]
    impl ChatClient for NamedClient {
        fn name(&self) -> &str {
            "named"
        }

        async fn invoke(&self, _messages: &[ChatMessage]) -> Result<ChatResponse, PipelineError> {
            Err(PipelineError::model("not used"))
        }
    }

    fn counting_cache() -> (ModelClientCache, Arc<AtomicU32>) {
        let built = Arc::new(AtomicU32::new(0));
        let counter = built.clone();
        let cache = ModelClientCache::with_factory(
            move |_role: &str, _temperature: f32| -> Result<ModelClientHandle, PipelineError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(NamedClient))
            },
        );
        (cache, built)
    }

    #[test]
    fn test_same_key_returns_same_handle() {
        let (cache, built) = counting_cache();
        let first = cache.get_client("chat", 0.0).unwrap();
        let second = cache.get_client("chat", 0.0).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_different_temperature_distinct_handles() {
        let (cache, built) = counting_cache();
        let cold = cache.get_client("chat", 0.0).unwrap();
        let warm = cache.get_client("chat", 0.7).unwrap();

        assert!(!Arc::ptr_eq(&cold, &warm));
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_different_role_distinct_handles() {
        let (cache, _) = counting_cache();
        let chat = cache.get_client("chat", 0.0).unwrap();
        let vision = cache.get_client("summarize_vision", 0.0).unwrap();
        assert!(!Arc::ptr_eq(&chat, &vision));
    }

    #[test]
    fn test_negative_zero_shares_entry() {
        let (cache, built) = counting_cache();
        let a = cache.get_client("chat", 0.0).unwrap();
        let b = cache.get_client("chat", -0.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let cache = ModelClientCache::with_factory(
            move |_role: &str, _temperature: f32| -> Result<ModelClientHandle, PipelineError> {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(PipelineError::model("Failed to initialize chat model"))
                } else {
                    Ok(Arc::new(NamedClient))
                }
            },
        );

        let err = cache.get_client("chat", 0.0).err().unwrap();
        assert!(err.to_string().contains("Failed to initialize chat model"));
        assert!(cache.get_client("chat", 0.0).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let (cache, built) = counting_cache();
        let cache = Arc::new(cache);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.get_client("chat", 0.0).is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }
}
