use crate::{
    config::Device,
    error::{EvalError, Result},
};
use serde::{de::DeserializeOwned, Deserialize};
use std::path::Path;
use tokenizers::Tokenizer;

/// Encode/decode primitives of a tokenizer library.
pub trait TokenEncoder: Send + Sync {
    fn encode(&self, text: &str, bos: bool, eos: bool, device: Device) -> Result<Vec<u32>>;

    fn decode(&self, ids: &[u32]) -> Result<String>;

    fn id_to_token(&self, id: u32) -> Option<String>;
}

/// `tokenizer.json` loaded through the `tokenizers` crate.
pub struct HfTokenizer {
    tokenizer: Tokenizer,
    bos_token_id: Option<u32>,
    eos_token_id: Option<u32>,
}

/// `bos_token`/`eos_token` are either a bare string or an added-token object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpecialToken {
    Content(String),
    Added { content: String },
}

#[derive(Debug, Default, Deserialize)]
struct TokenizerConfigFile {
    #[serde(default)]
    bos_token: Option<SpecialToken>,
    #[serde(default)]
    eos_token: Option<SpecialToken>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenIds {
    One(u32),
    Many(Vec<u32>),
}

#[derive(Debug, Default, Deserialize)]
struct GenerationConfigFile {
    #[serde(default)]
    bos_token_id: Option<TokenIds>,
    #[serde(default)]
    eos_token_id: Option<TokenIds>,
}

impl SpecialToken {
    fn content(&self) -> &str {
        match self {
            SpecialToken::Content(content) | SpecialToken::Added { content } => content,
        }
    }
}

impl TokenIds {
    fn first(&self) -> Option<u32> {
        match self {
            TokenIds::One(id) => Some(*id),
            TokenIds::Many(ids) => ids.first().copied(),
        }
    }
}

/// Reads an optional JSON file from the checkpoint; absent files give the default.
fn read_optional_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| EvalError::SerializationError(format!("{}: {}", path.display(), e)))
}

impl HfTokenizer {
    /// Loads `tokenizer.json` and resolves the special tokens. `tokenizer_config.json`
    /// names them first, then `generation_config.json` gives ids, then well-known
    /// token names are tried.
    pub fn from_checkpoint(checkpoint_dir: impl AsRef<Path>) -> Result<Self> {
        let checkpoint_dir = checkpoint_dir.as_ref();
        let path = checkpoint_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| EvalError::TokenizerError(format!("{}: {}", path.display(), e)))?;

        let config: TokenizerConfigFile =
            read_optional_json(&checkpoint_dir.join("tokenizer_config.json"))?;
        let generation: GenerationConfigFile =
            read_optional_json(&checkpoint_dir.join("generation_config.json"))?;

        let bos_token_id = match &config.bos_token {
            Some(token) => Some(named_token_id(&tokenizer, token, "bos_token")?),
            None => generation
                .bos_token_id
                .as_ref()
                .and_then(TokenIds::first)
                .or_else(|| {
                    tokenizer
                        .token_to_id("<|begin_of_text|>")
                        .or_else(|| tokenizer.token_to_id("<s>"))
                        .or_else(|| tokenizer.token_to_id("<|endoftext|>"))
                }),
        };
        let eos_token_id = match &config.eos_token {
            Some(token) => Some(named_token_id(&tokenizer, token, "eos_token")?),
            None => generation
                .eos_token_id
                .as_ref()
                .and_then(TokenIds::first)
                .or_else(|| {
                    tokenizer
                        .token_to_id("<|end_of_text|>")
                        .or_else(|| tokenizer.token_to_id("</s>"))
                        .or_else(|| tokenizer.token_to_id("<|endoftext|>"))
                }),
        };

        log::info!(
            "Loaded tokenizer from {} (vocab size {}, bos {:?}, eos {:?})",
            path.display(),
            tokenizer.get_vocab_size(true),
            bos_token_id,
            eos_token_id
        );

        Ok(Self {
            tokenizer,
            bos_token_id,
            eos_token_id,
        })
    }

    pub fn bos_token_id(&self) -> Option<u32> {
        self.bos_token_id
    }

    pub fn eos_token_id(&self) -> Option<u32> {
        self.eos_token_id
    }
}

fn named_token_id(tokenizer: &Tokenizer, token: &SpecialToken, field: &str) -> Result<u32> {
    tokenizer.token_to_id(token.content()).ok_or_else(|| {
        EvalError::TokenizerError(format!(
            "{} {:?} from tokenizer_config.json is not in the vocabulary",
            field,
            token.content()
        ))
    })
}

impl TokenEncoder for HfTokenizer {
    fn encode(&self, text: &str, bos: bool, eos: bool, device: Device) -> Result<Vec<u32>> {
        // Token ids are produced on the host regardless of device.
        log::trace!("Encoding {} bytes for device {}", text.len(), device);

        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| EvalError::TokenizerError(e.to_string()))?;
        let mut ids = encoding.get_ids().to_vec();

        if bos {
            let bos_id = self.bos_token_id.ok_or_else(|| {
                EvalError::TokenizerError("tokenizer has no beginning-of-sequence token".into())
            })?;
            if ids.first() != Some(&bos_id) {
                ids.insert(0, bos_id);
            }
        }
        if eos {
            let eos_id = self.eos_token_id.ok_or_else(|| {
                EvalError::TokenizerError("tokenizer has no end-of-sequence token".into())
            })?;
            ids.push(eos_id);
        }

        Ok(ids)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| EvalError::TokenizerError(e.to_string()))
    }

    fn id_to_token(&self, id: u32) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const WORD_LEVEL_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 0, "content": "<s>", "single_word": false, "lstrip": false,
             "rstrip": false, "normalized": false, "special": true},
            {"id": 1, "content": "</s>", "single_word": false, "lstrip": false,
             "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"<s>": 0, "</s>": 1, "[UNK]": 2, "hello": 3, "world": 4},
            "unk_token": "[UNK]"
        }
    }"#;

    fn load() -> (tempfile::TempDir, HfTokenizer) {
        load_with(&[])
    }

    fn load_with(extra_files: &[(&str, &str)]) -> (tempfile::TempDir, HfTokenizer) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), WORD_LEVEL_TOKENIZER).unwrap();
        for (name, contents) in extra_files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        let tokenizer = HfTokenizer::from_checkpoint(dir.path()).unwrap();
        (dir, tokenizer)
    }

    #[test]
    fn test_tokenizer_config_names_special_tokens() {
        let (_dir, tokenizer) = load_with(&[(
            "tokenizer_config.json",
            r#"{"bos_token": "</s>", "eos_token": {"content": "<s>", "special": true}}"#,
        )]);
        assert_eq!(tokenizer.bos_token_id(), Some(1));
        assert_eq!(tokenizer.eos_token_id(), Some(0));
        assert_eq!(
            tokenizer.encode("hello", true, false, Device::Cpu).unwrap(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_generation_config_ids_are_the_fallback() {
        let (_dir, tokenizer) = load_with(&[
            ("tokenizer_config.json", r#"{"bos_token": null}"#),
            ("generation_config.json", r#"{"bos_token_id": 4, "eos_token_id": [2, 1]}"#),
        ]);
        assert_eq!(tokenizer.bos_token_id(), Some(4));
        assert_eq!(tokenizer.eos_token_id(), Some(2));
    }

    #[test]
    fn test_unknown_configured_token_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), WORD_LEVEL_TOKENIZER).unwrap();
        std::fs::write(
            dir.path().join("tokenizer_config.json"),
            r#"{"bos_token": "<|im_start|>"}"#,
        )
        .unwrap();

        match HfTokenizer::from_checkpoint(dir.path()) {
            Err(EvalError::TokenizerError(msg)) => assert!(msg.contains("<|im_start|>")),
            other => panic!("expected tokenizer error, got {:?}", other.map(|t| t.bos_token_id())),
        }
    }

    #[test]
    fn test_special_token_ids() {
        let (_dir, tokenizer) = load();
        assert_eq!(tokenizer.bos_token_id(), Some(0));
        assert_eq!(tokenizer.eos_token_id(), Some(1));
    }

    #[test]
    fn test_encode_markers() {
        let (_dir, tokenizer) = load();
        assert_eq!(
            tokenizer.encode("hello world", false, false, Device::Cpu).unwrap(),
            vec![3, 4]
        );
        assert_eq!(
            tokenizer.encode("hello world", true, false, Device::Auto).unwrap(),
            vec![0, 3, 4]
        );
        assert_eq!(
            tokenizer.encode("hello", true, true, Device::Cuda(0)).unwrap(),
            vec![0, 3, 1]
        );
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let (_dir, tokenizer) = load();
        assert_eq!(
            tokenizer.encode("hello moon", false, false, Device::Cpu).unwrap(),
            vec![3, 2]
        );
    }

    #[test]
    fn test_decode_skips_special_tokens() {
        let (_dir, tokenizer) = load();
        assert_eq!(tokenizer.decode(&[0, 3, 4]).unwrap(), "hello world");
        assert_eq!(tokenizer.id_to_token(4).as_deref(), Some("world"));
        assert_eq!(tokenizer.id_to_token(99), None);
    }

    #[test]
    fn test_missing_tokenizer_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            HfTokenizer::from_checkpoint(dir.path()),
            Err(EvalError::TokenizerError(_))
        ));
    }
}
