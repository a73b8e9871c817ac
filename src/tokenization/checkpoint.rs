use crate::{
    cache::Cache,
    config::{Device, TokenizerConfig},
    error::{EvalError, Result},
    models::{DecodeRequest, RawTokenization, TokenizationRequest},
    tokenization::{
        caching::CachingTokenizer,
        encoder::{HfTokenizer, TokenEncoder},
    },
};
use std::path::Path;
use std::sync::Arc;

pub const REQUIRED_CHECKPOINT_FILES: [&str; 3] =
    ["lit_model.pth", "lit_config.json", "tokenizer_config.json"];

/// Fails with `InvalidCheckpoint` unless `dir` holds a complete checkpoint.
///
/// Besides [`REQUIRED_CHECKPOINT_FILES`] the directory needs `tokenizer.json`.
/// A SentencePiece `tokenizer.model` alone is rejected since the tokenizer
/// backend only reads the JSON format.
pub fn validate_checkpoint_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(EvalError::InvalidCheckpoint(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut missing: Vec<&str> = REQUIRED_CHECKPOINT_FILES
        .iter()
        .copied()
        .filter(|file| !dir.join(file).is_file())
        .collect();

    let has_json_tokenizer = dir.join("tokenizer.json").is_file();
    let has_sentencepiece = dir.join("tokenizer.model").is_file();
    if !has_json_tokenizer && !has_sentencepiece {
        missing.push("tokenizer.json or tokenizer.model");
    }

    if !missing.is_empty() {
        return Err(EvalError::InvalidCheckpoint(format!(
            "{} is missing {}",
            dir.display(),
            missing.join(", ")
        )));
    }

    if !has_json_tokenizer {
        return Err(EvalError::InvalidCheckpoint(format!(
            "{} only has tokenizer.model; convert it to tokenizer.json to load it",
            dir.display()
        )));
    }
    Ok(())
}

/// Tokenizer for a local model checkpoint.
pub struct CheckpointTokenizer {
    cache: Arc<dyn Cache>,
    encoder: Box<dyn TokenEncoder>,
    device: Device,
}

impl CheckpointTokenizer {
    pub fn new(cache: Arc<dyn Cache>, config: &TokenizerConfig) -> Result<Self> {
        validate_checkpoint_dir(&config.checkpoint_dir)?;
        let encoder = HfTokenizer::from_checkpoint(&config.checkpoint_dir)?;
        Ok(Self::with_encoder(cache, Box::new(encoder), config.device))
    }

    pub fn with_encoder(
        cache: Arc<dyn Cache>,
        encoder: Box<dyn TokenEncoder>,
        device: Device,
    ) -> Self {
        Self {
            cache,
            encoder,
            device,
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl CachingTokenizer for CheckpointTokenizer {
    fn cache(&self) -> &dyn Cache {
        self.cache.as_ref()
    }

    fn tokenize_do_it(&self, request: &TokenizationRequest) -> Result<RawTokenization> {
        let ids = self.encoder.encode(&request.text, true, false, self.device)?;
        if request.encode {
            return Ok(RawTokenization::TokenIds(ids));
        }

        let strings = ids
            .iter()
            .map(|&id| {
                self.encoder
                    .id_to_token(id)
                    .ok_or_else(|| EvalError::TokenizerError(format!("unknown token id {}", id)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RawTokenization::TokenStrings(strings))
    }

    fn decode_do_it(&self, request: &DecodeRequest) -> Result<String> {
        self.encoder.decode(&request.tokens)
    }
}
