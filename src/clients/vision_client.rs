use crate::{
    cache::{Cache, CacheKey, CacheLookup},
    clients::Client,
    error::{EvalError, Result},
    file_cache::FileCache,
    logger,
    models::{Request, RequestResult, Sequence, TextToImageRequest},
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub const SUPPORTED_ENGINE: &str = "m-vader";

pub const DEFAULT_IMAGE_WIDTH: u32 = 512;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 512;
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;
pub const DEFAULT_STEPS: u32 = 50;

/// Cached output of an offline image generation run.
#[derive(Debug, Deserialize)]
struct CachedImageResponse {
    images: Vec<String>,
    request_time: f64,
    #[serde(default)]
    request_datetime: Option<i64>,
}

/// Text-to-image client for the m-vader engine. Offline evaluation only:
/// results are read from a cache populated out of band and never generated live.
#[derive(Clone)]
pub struct VisionClient {
    cache: Arc<dyn Cache>,
    file_cache: Arc<dyn FileCache>,
}

impl VisionClient {
    pub fn new(cache: Arc<dyn Cache>, file_cache: Arc<dyn FileCache>) -> Self {
        Self { cache, file_cache }
    }

    /// Where offline population stores generated images. Lookups never rewrite
    /// the cached paths.
    pub fn file_cache(&self) -> &dyn FileCache {
        self.file_cache.as_ref()
    }

    pub fn convert_to_raw_request(request: &TextToImageRequest) -> Map<String, Value> {
        let (width, height) = match (request.width, request.height) {
            (Some(width), Some(height)) => (width, height),
            _ => (DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT),
        };

        let raw_request = json!({
            "request_type": "image-model-inference",
            "model": request.model_engine(),
            "prompt": request.prompt,
            "n": request.num_completions,
            "guidance_scale": request.guidance_scale.unwrap_or(DEFAULT_GUIDANCE_SCALE),
            "steps": request.steps.unwrap_or(DEFAULT_STEPS),
            "width": width,
            "height": height,
        });

        match raw_request {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn make_cache_key(
        raw_request: Map<String, Value>,
        request: &TextToImageRequest,
    ) -> CacheKey {
        let mut key = CacheKey::from(raw_request);
        if let Some(random) = &request.random {
            key.insert("random", random.as_str());
        }
        key
    }

    pub async fn generate(&self, request: &Request) -> Result<RequestResult> {
        let request = match request {
            Request::TextToImage(request) => request,
            other => return Err(EvalError::InvalidRequestType(format!("{:?}", other))),
        };

        if request.model_engine() != SUPPORTED_ENGINE {
            return Err(EvalError::UnsupportedModel(request.model_engine().to_string()));
        }

        let cache_key = Self::make_cache_key(Self::convert_to_raw_request(request), request);

        match self.fetch(&cache_key).await {
            Ok((response, cached)) => Ok(Self::to_result(response, cached)),
            Err(EvalError::CacheMiss(key)) => {
                log::warn!("No cached result for {}", key);
                let error = EvalError::CacheMiss(key);
                Ok(RequestResult::failure(format!("VisionClient error: {}", error)))
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch(&self, cache_key: &CacheKey) -> Result<(CachedImageResponse, bool)> {
        let _timer = logger::timer("vision cache lookup");
        match self.cache.lookup(cache_key).await? {
            CacheLookup::Hit(value) => {
                let response: CachedImageResponse = serde_json::from_value(value).map_err(|e| {
                    EvalError::SerializationError(format!("Malformed cached image response: {}", e))
                })?;
                Ok((response, true))
            }
            CacheLookup::Miss => Err(EvalError::CacheMiss(cache_key.canonical())),
        }
    }

    fn to_result(response: CachedImageResponse, cached: bool) -> RequestResult {
        let completions = response.images.into_iter().map(Sequence::image).collect();

        RequestResult {
            success: true,
            cached,
            error: None,
            completions,
            embedding: Vec::new(),
            request_time: Some(response.request_time),
            request_datetime: response.request_datetime,
        }
    }
}

#[async_trait]
impl Client for VisionClient {
    async fn make_request(&self, request: &Request) -> Result<RequestResult> {
        self.generate(request).await
    }

    fn name(&self) -> &str {
        "VisionClient"
    }
}
