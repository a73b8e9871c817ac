use crate::{
    cache::{
        key::CacheKey,
        traits::{Cache, CacheLookup, CacheStats},
    },
    error::{EvalError, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Serialize, Deserialize)]
struct CacheRecord {
    request: CacheKey,
    response: Value,
}

/// Cache persisted as JSON lines, one `{"request": .., "response": ..}` record
/// per line. Later records for the same key win.
pub struct JsonFileCache {
    path: PathBuf,
    read_only: bool,
    entries: Mutex<HashMap<String, Value>>,
    stats: Mutex<CacheStats>,
}

impl JsonFileCache {
    pub fn open(path: impl AsRef<Path>, read_only: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = HashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: CacheRecord = serde_json::from_str(&line).map_err(|e| {
                    EvalError::SerializationError(format!(
                        "{}:{}: {}",
                        path.display(),
                        index + 1,
                        e
                    ))
                })?;
                entries.insert(record.request.canonical(), record.response);
            }
        } else if read_only {
            return Err(EvalError::ConfigError(format!(
                "Cache file {} does not exist",
                path.display()
            )));
        }

        log::info!(
            "Opened cache {} with {} entries{}",
            path.display(),
            entries.len(),
            if read_only { " (read-only)" } else { "" }
        );

        Ok(Self {
            path,
            read_only,
            entries: Mutex::new(entries),
            stats: Mutex::new(CacheStats::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.lock().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn append(&self, record: &CacheRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }
}

fn poisoned<T>(_: T) -> EvalError {
    EvalError::ConfigError("file cache lock poisoned".into())
}

#[async_trait]
impl Cache for JsonFileCache {
    async fn lookup(&self, key: &CacheKey) -> Result<CacheLookup> {
        let lookup = match self.entries.lock().map_err(poisoned)?.get(&key.canonical()) {
            Some(value) => CacheLookup::Hit(value.clone()),
            None => CacheLookup::Miss,
        };
        self.stats.lock().map_err(poisoned)?.record(&lookup);
        Ok(lookup)
    }

    async fn put(&self, key: &CacheKey, value: Value) -> Result<()> {
        if self.read_only {
            return Err(EvalError::CacheReadOnly(self.path.display().to_string()));
        }

        let record = CacheRecord {
            request: key.clone(),
            response: value,
        };
        self.append(&record)?;

        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.canonical(), record.response);
        self.stats.lock().map_err(poisoned)?.writes += 1;
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.stats.lock().map(|stats| *stats).unwrap_or_default()
    }
}
