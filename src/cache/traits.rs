use crate::{cache::key::CacheKey, error::Result};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Value),
    Miss,
}

#[async_trait]
pub trait Cache: Send + Sync {
    async fn lookup(&self, key: &CacheKey) -> Result<CacheLookup>;
    async fn put(&self, key: &CacheKey, value: Value) -> Result<()>;

    fn stats(&self) -> CacheStats;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

impl CacheStats {
    pub fn record(&mut self, lookup: &CacheLookup) {
        match lookup {
            CacheLookup::Hit(_) => self.hits += 1,
            CacheLookup::Miss => self.misses += 1,
        }
    }
}
