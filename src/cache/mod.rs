pub mod file;
pub mod key;
pub mod memory;
pub mod traits;

use crate::{config::CacheConfig, error::Result};
use std::sync::Arc;

pub use file::JsonFileCache;
pub use key::CacheKey;
pub use memory::MemoryCache;
pub use traits::{Cache, CacheLookup, CacheStats};

/// Opens the cache store selected by `config`: a JSON-lines file when a path is
/// set, otherwise an in-memory map.
pub fn open(config: &CacheConfig) -> Result<Arc<dyn Cache>> {
    let cache: Arc<dyn Cache> = match &config.path {
        Some(path) => Arc::new(JsonFileCache::open(path, config.read_only)?),
        None => {
            log::warn!("No cache path configured, using an in-memory cache");
            Arc::new(MemoryCache::new())
        }
    };
    Ok(cache)
}
