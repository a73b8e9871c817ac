use crate::{
    cache::{
        key::CacheKey,
        traits::{Cache, CacheLookup, CacheStats},
    },
    error::{EvalError, Result},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local cache. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Value>>,
    stats: Mutex<CacheStats>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.lock().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> EvalError {
    EvalError::ConfigError("memory cache lock poisoned".into())
}

#[async_trait]
impl Cache for MemoryCache {
    async fn lookup(&self, key: &CacheKey) -> Result<CacheLookup> {
        let lookup = match self.entries.lock().map_err(poisoned)?.get(&key.canonical()) {
            Some(value) => CacheLookup::Hit(value.clone()),
            None => CacheLookup::Miss,
        };
        self.stats.lock().map_err(poisoned)?.record(&lookup);
        Ok(lookup)
    }

    async fn put(&self, key: &CacheKey, value: Value) -> Result<()> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.canonical(), value);
        self.stats.lock().map_err(poisoned)?.writes += 1;
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().map(|stats| *stats).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_poisoned_lock_fails_instead_of_reporting_empty() {
        let cache = std::sync::Arc::new(MemoryCache::new());
        cache.put(&CacheKey::new(), json!(1)).await.unwrap();

        let holder = cache.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.entries.lock().unwrap();
            panic!("poisoning the entries lock");
        })
        .join();

        assert!(matches!(cache.len(), Err(EvalError::ConfigError(_))));
        assert!(cache.lookup(&CacheKey::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MemoryCache::new();
        let key = CacheKey::new().with_field("prompt", "a cat");

        assert_eq!(cache.lookup(&key).await.unwrap(), CacheLookup::Miss);
        cache.put(&key, json!({"images": []})).await.unwrap();
        assert_eq!(
            cache.lookup(&key).await.unwrap(),
            CacheLookup::Hit(json!({"images": []}))
        );

        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                writes: 1
            }
        );
        assert_eq!(cache.len().unwrap(), 1);
    }
}
