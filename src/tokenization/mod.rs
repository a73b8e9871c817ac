//! Tokenizers backed by a shared request cache.
//!
//! [`CachingTokenizer`] owns the cache round trip; implementations only provide
//! the uncached computation. [`CheckpointTokenizer`] is the implementation for
//! local model checkpoints.

mod caching;
mod checkpoint;
mod encoder;

pub use caching::CachingTokenizer;
pub use checkpoint::{validate_checkpoint_dir, CheckpointTokenizer, REQUIRED_CHECKPOINT_FILES};
pub use encoder::{HfTokenizer, TokenEncoder};
