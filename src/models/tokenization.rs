use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizationRequest {
    pub text: String,
    pub tokenizer: String,
    /// `true` returns token ids, `false` returns token strings.
    pub encode: bool,
    pub truncation: bool,
    pub max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenizationToken {
    Id(u32),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizationRequestResult {
    pub success: bool,
    pub cached: bool,
    pub text: String,
    pub tokens: Vec<TokenizationToken>,
    pub error: Option<String>,
    pub request_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequest {
    pub tokens: Vec<u32>,
    pub tokenizer: String,
    pub clean_up_tokenization_spaces: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequestResult {
    pub success: bool,
    pub cached: bool,
    pub text: String,
    pub error: Option<String>,
    pub request_time: Option<f64>,
}

/// Output of an uncached tokenize computation, as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawTokenization {
    TokenIds(Vec<u32>),
    TokenStrings(Vec<String>),
}

impl TokenizationRequest {
    pub fn new(text: impl Into<String>, tokenizer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokenizer: tokenizer.into(),
            encode: false,
            truncation: false,
            max_length: 2048,
        }
    }

    pub fn encoding(mut self, encode: bool) -> Self {
        self.encode = encode;
        self
    }

    pub fn truncated_to(mut self, max_length: usize) -> Self {
        self.truncation = true;
        self.max_length = max_length;
        self
    }
}

impl DecodeRequest {
    pub fn new(tokens: Vec<u32>, tokenizer: impl Into<String>) -> Self {
        Self {
            tokens,
            tokenizer: tokenizer.into(),
            clean_up_tokenization_spaces: false,
        }
    }
}

impl RawTokenization {
    pub fn into_tokens(self) -> Vec<TokenizationToken> {
        match self {
            RawTokenization::TokenIds(ids) => ids.into_iter().map(TokenizationToken::Id).collect(),
            RawTokenization::TokenStrings(strings) => {
                strings.into_iter().map(TokenizationToken::Text).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_tokenization_wire_shape() {
        let ids = serde_json::to_value(RawTokenization::TokenIds(vec![1, 2])).unwrap();
        assert_eq!(ids, json!({"token_ids": [1, 2]}));

        let strings =
            serde_json::to_value(RawTokenization::TokenStrings(vec!["a".into()])).unwrap();
        assert_eq!(strings, json!({"token_strings": ["a"]}));
    }

    #[test]
    fn test_tokens_serialize_untagged() {
        let tokens = vec![TokenizationToken::Id(7), TokenizationToken::Text("hi".into())];
        assert_eq!(serde_json::to_value(&tokens).unwrap(), json!([7, "hi"]));
    }
}
