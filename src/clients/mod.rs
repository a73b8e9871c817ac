pub mod vision_client;

use crate::{
    error::{EvalError, Result},
    models::{
        DecodeRequest, DecodeRequestResult, Request, RequestResult, TokenizationRequest,
        TokenizationRequestResult,
    },
};
use async_trait::async_trait;

pub use vision_client::VisionClient;

/// A model client. Every client generates; tokenization is an optional
/// capability that clients opt into by overriding `tokenize` and `decode`.
#[async_trait]
pub trait Client: Send + Sync {
    async fn make_request(&self, request: &Request) -> Result<RequestResult>;

    async fn tokenize(&self, _request: &TokenizationRequest) -> Result<TokenizationRequestResult> {
        Err(EvalError::NotSupported(format!(
            "{} does not support tokenizing",
            self.name()
        )))
    }

    async fn decode(&self, _request: &DecodeRequest) -> Result<DecodeRequestResult> {
        Err(EvalError::NotSupported(format!(
            "{} does not support decoding",
            self.name()
        )))
    }

    fn name(&self) -> &str;
}
