pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod file_cache;
pub mod logger;
pub mod models;
pub mod tokenization;

pub use cache::{Cache, CacheKey, CacheLookup, CacheStats, JsonFileCache, MemoryCache};
pub use clients::{Client, VisionClient};
pub use config::{CacheConfig, Config, Device, FileCacheConfig, TokenizerConfig};
pub use error::{EvalError, Result};
pub use file_cache::{FileCache, LocalFileCache};
pub use models::*;
pub use tokenization::{CachingTokenizer, CheckpointTokenizer, HfTokenizer, TokenEncoder};
