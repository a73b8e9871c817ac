use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub path: Option<PathBuf>,
    pub read_only: bool,
}

#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    pub base_path: PathBuf,
    pub file_extension: String,
}

#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    pub name: String,
    pub checkpoint_dir: PathBuf,
    pub device: Device,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub cache: CacheConfig,
    pub file_cache: FileCacheConfig,
    pub tokenizer: Option<TokenizerConfig>,
}

/// Compute device handed to the tokenizer's encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Auto => write!(f, "auto"),
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(index) => write!(f, "cuda:{}", index),
        }
    }
}

impl FromStr for Device {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Device::Auto),
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda(0)),
            other => match other.strip_prefix("cuda:") {
                Some(index) => index
                    .parse()
                    .map(Device::Cuda)
                    .map_err(|_| EvalError::ConfigError(format!("Invalid device: {}", s))),
                None => Err(EvalError::ConfigError(format!("Invalid device: {}", s))),
            },
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            path: None,
            read_only: false,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let path = env::var("EVAL_CACHE_PATH").ok().map(PathBuf::from);
        let read_only = env::var("EVAL_CACHE_READ_ONLY")
            .ok()
            .map_or(false, |val| val == "true");

        CacheConfig { path, read_only }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        FileCacheConfig {
            base_path: PathBuf::from("cache/output"),
            file_extension: "png".to_string(),
        }
    }
}

impl FileCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_path = env::var("EVAL_FILE_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.base_path);
        let file_extension = env::var("EVAL_FILE_EXTENSION").unwrap_or(defaults.file_extension);

        FileCacheConfig {
            base_path,
            file_extension,
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }
}

impl TokenizerConfig {
    pub fn new(name: impl Into<String>, checkpoint_dir: impl Into<PathBuf>) -> Self {
        TokenizerConfig {
            name: name.into(),
            checkpoint_dir: checkpoint_dir.into(),
            device: Device::Auto,
        }
    }

    /// Returns `Ok(None)` when no checkpoint directory is configured.
    pub fn from_env() -> Result<Option<Self>> {
        let checkpoint_dir = match env::var("EVAL_CHECKPOINT_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => return Ok(None),
        };
        let name = env::var("EVAL_TOKENIZER_NAME")
            .unwrap_or_else(|_| "lightningai/lit-gpt".to_string());
        let device = match env::var("EVAL_DEVICE") {
            Ok(device) => device.parse()?,
            Err(_) => Device::Auto,
        };

        Ok(Some(TokenizerConfig {
            name,
            checkpoint_dir,
            device,
        }))
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Ok(Config {
            cache: CacheConfig::from_env(),
            file_cache: FileCacheConfig::from_env(),
            tokenizer: TokenizerConfig::from_env()?,
        })
    }

    pub fn with_cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn with_file_cache(mut self, config: FileCacheConfig) -> Self {
        self.file_cache = config;
        self
    }

    pub fn with_tokenizer(mut self, config: TokenizerConfig) -> Self {
        self.tokenizer = Some(config);
        self
    }
}
