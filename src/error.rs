use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Wrong type of request: {0}")]
    InvalidRequestType(String),
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),
    #[error("The result has not been uploaded to the cache for the following request: {0}")]
    CacheMiss(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("Invalid checkpoint directory: {0}")]
    InvalidCheckpoint(String),
    #[error("Cache is read-only: {0}")]
    CacheReadOnly(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        EvalError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_miss_message_names_the_key() {
        let err = EvalError::CacheMiss("{\"model\":\"m-vader\"}".into());
        assert!(err.to_string().contains("has not been uploaded"));
        assert!(err.to_string().contains("m-vader"));
    }

    #[test]
    fn test_json_errors_become_serialization_errors() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: EvalError = parse.unwrap_err().into();
        assert!(matches!(err, EvalError::SerializationError(_)));
    }
}
