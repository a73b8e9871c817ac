use crate::{
    cache::{Cache, CacheKey, CacheLookup},
    error::Result,
    logger,
    models::{
        DecodeRequest, DecodeRequestResult, RawTokenization, TokenizationRequest,
        TokenizationRequestResult,
    },
};
use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;

#[async_trait]
pub trait CachingTokenizer: Send + Sync {
    fn cache(&self) -> &dyn Cache;

    /// Tokenizes without consulting the cache.
    fn tokenize_do_it(&self, request: &TokenizationRequest) -> Result<RawTokenization>;

    /// Decodes without consulting the cache.
    fn decode_do_it(&self, request: &DecodeRequest) -> Result<String>;

    fn tokenize_cache_key(&self, request: &TokenizationRequest) -> CacheKey {
        CacheKey::new()
            .with_field("text", request.text.as_str())
            .with_field("tokenizer", request.tokenizer.as_str())
            .with_field("encode", request.encode)
    }

    fn decode_cache_key(&self, request: &DecodeRequest) -> CacheKey {
        CacheKey::new()
            .with_field("tokens", json!(request.tokens))
            .with_field("tokenizer", request.tokenizer.as_str())
            .with_field(
                "clean_up_tokenization_spaces",
                request.clean_up_tokenization_spaces,
            )
    }

    async fn tokenize(&self, request: &TokenizationRequest) -> Result<TokenizationRequestResult> {
        let key = self.tokenize_cache_key(request);
        let start = Instant::now();

        let (raw, cached) = match self.cache().lookup(&key).await? {
            CacheLookup::Hit(value) => (serde_json::from_value::<RawTokenization>(value)?, true),
            CacheLookup::Miss => {
                let raw = {
                    let _timer = logger::timer(format!("tokenize with {}", request.tokenizer));
                    self.tokenize_do_it(request)?
                };
                self.cache().put(&key, serde_json::to_value(&raw)?).await?;
                (raw, false)
            }
        };

        let mut tokens = raw.into_tokens();
        if request.truncation {
            tokens.truncate(request.max_length);
        }

        Ok(TokenizationRequestResult {
            success: true,
            cached,
            text: request.text.clone(),
            tokens,
            error: None,
            request_time: Some(start.elapsed().as_secs_f64()),
        })
    }

    async fn decode(&self, request: &DecodeRequest) -> Result<DecodeRequestResult> {
        let key = self.decode_cache_key(request);
        let start = Instant::now();

        let (text, cached) = match self.cache().lookup(&key).await? {
            CacheLookup::Hit(value) => (serde_json::from_value::<DecodedText>(value)?.text, true),
            CacheLookup::Miss => {
                let text = {
                    let _timer = logger::timer(format!("decode with {}", request.tokenizer));
                    self.decode_do_it(request)?
                };
                self.cache()
                    .put(&key, serde_json::to_value(DecodedText { text: text.clone() })?)
                    .await?;
                (text, false)
            }
        };

        Ok(DecodeRequestResult {
            success: true,
            cached,
            text,
            error: None,
            request_time: Some(start.elapsed().as_secs_f64()),
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct DecodedText {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cache::MemoryCache, error::EvalError, models::TokenizationToken};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Splits on whitespace and numbers words by length.
    #[derive(Default)]
    struct WordLengthTokenizer {
        cache: MemoryCache,
        computations: AtomicUsize,
    }

    impl CachingTokenizer for WordLengthTokenizer {
        fn cache(&self) -> &dyn Cache {
            &self.cache
        }

        fn tokenize_do_it(&self, request: &TokenizationRequest) -> Result<RawTokenization> {
            self.computations.fetch_add(1, Ordering::SeqCst);
            let words = request.text.split_whitespace();
            Ok(if request.encode {
                RawTokenization::TokenIds(words.map(|w| w.len() as u32).collect())
            } else {
                RawTokenization::TokenStrings(words.map(String::from).collect())
            })
        }

        fn decode_do_it(&self, request: &DecodeRequest) -> Result<String> {
            self.computations.fetch_add(1, Ordering::SeqCst);
            if request.tokens.is_empty() {
                return Err(EvalError::TokenizerError("nothing to decode".into()));
            }
            Ok(request
                .tokens
                .iter()
                .map(|t| "x".repeat(*t as usize))
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    #[tokio::test]
    async fn test_second_tokenize_is_cached() {
        let tokenizer = WordLengthTokenizer::default();
        let request = TokenizationRequest::new("the quick fox", "words").encoding(true);

        let first = tokenizer.tokenize(&request).await.unwrap();
        let second = tokenizer.tokenize(&request).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.tokens, second.tokens);
        assert_eq!(
            first.tokens,
            vec![
                TokenizationToken::Id(3),
                TokenizationToken::Id(5),
                TokenizationToken::Id(3)
            ]
        );
        assert_eq!(tokenizer.computations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_encode_flag_is_part_of_the_key() {
        let tokenizer = WordLengthTokenizer::default();
        let ids = tokenizer
            .tokenize(&TokenizationRequest::new("a b", "words").encoding(true))
            .await
            .unwrap();
        let strings = tokenizer
            .tokenize(&TokenizationRequest::new("a b", "words"))
            .await
            .unwrap();

        assert!(!strings.cached);
        assert_eq!(ids.tokens, vec![TokenizationToken::Id(1), TokenizationToken::Id(1)]);
        assert_eq!(
            strings.tokens,
            vec![
                TokenizationToken::Text("a".into()),
                TokenizationToken::Text("b".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_truncation_applies_after_lookup() {
        let tokenizer = WordLengthTokenizer::default();
        let full = TokenizationRequest::new("one two three four", "words").encoding(true);
        let truncated = full.clone().truncated_to(2);

        assert_eq!(tokenizer.tokenize(&truncated).await.unwrap().tokens.len(), 2);
        let result = tokenizer.tokenize(&full).await.unwrap();
        assert!(result.cached);
        assert_eq!(result.tokens.len(), 4);
    }

    #[tokio::test]
    async fn test_decode_round_trip_through_cache() {
        let tokenizer = WordLengthTokenizer::default();
        let request = DecodeRequest::new(vec![1, 3], "words");

        let first = tokenizer.decode(&request).await.unwrap();
        let second = tokenizer.decode(&request).await.unwrap();
        assert_eq!(first.text, "x xxx");
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.text, "x xxx");
    }

    #[tokio::test]
    async fn test_failed_computation_is_not_cached() {
        let tokenizer = WordLengthTokenizer::default();
        let request = DecodeRequest::new(vec![], "words");

        assert!(tokenizer.decode(&request).await.is_err());
        assert!(tokenizer.decode(&request).await.is_err());
        assert_eq!(tokenizer.cache.stats().writes, 0);
    }
}
