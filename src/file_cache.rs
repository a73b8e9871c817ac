use crate::{
    config::FileCacheConfig,
    error::{EvalError, Result},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Maps artifact identifiers (generated images and the like) to file locations.
pub trait FileCache: Send + Sync {
    fn resolve(&self, reference: &str) -> PathBuf;
}

pub struct LocalFileCache {
    base_path: PathBuf,
    file_extension: String,
}

impl LocalFileCache {
    pub fn new(config: &FileCacheConfig) -> Self {
        Self {
            base_path: config.base_path.clone(),
            file_extension: config.file_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn generate_unique_file_path(&self) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", Uuid::new_v4(), self.file_extension))
    }

    /// Writes `contents` to a fresh file under the base directory.
    pub fn store(&self, contents: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.generate_unique_file_path();
        fs::write(&path, contents)?;
        log::debug!("Stored {} bytes at {}", contents.len(), path.display());
        Ok(path)
    }

    pub fn store_base64(&self, data: &str) -> Result<PathBuf> {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| EvalError::SerializationError(format!("Invalid base64 artifact: {}", e)))?;
        self.store(&bytes)
    }
}

impl FileCache for LocalFileCache {
    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}
