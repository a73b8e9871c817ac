use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub num_completions: u32,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub random: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToImageRequest {
    pub model: String,
    pub prompt: String,
    pub num_completions: u32,
    pub guidance_scale: Option<f64>,
    pub steps: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub random: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Completion(CompletionRequest),
    TextToImage(TextToImageRequest),
}

/// Engine part of a `"<organization>/<engine>"` model name.
fn engine_of(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            num_completions: 1,
            max_tokens: None,
            temperature: None,
            random: None,
        }
    }
}

impl TextToImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            num_completions: 1,
            guidance_scale: None,
            steps: None,
            width: None,
            height: None,
            random: None,
        }
    }

    pub fn with_num_completions(mut self, n: u32) -> Self {
        self.num_completions = n;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = Some(guidance_scale);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_random(mut self, random: impl Into<String>) -> Self {
        self.random = Some(random.into());
        self
    }

    pub fn model_engine(&self) -> &str {
        engine_of(&self.model)
    }
}

impl Request {
    pub fn model(&self) -> &str {
        match self {
            Request::Completion(r) => &r.model,
            Request::TextToImage(r) => &r.model,
        }
    }

    pub fn model_engine(&self) -> &str {
        engine_of(self.model())
    }

    pub fn random(&self) -> Option<&str> {
        match self {
            Request::Completion(r) => r.random.as_deref(),
            Request::TextToImage(r) => r.random.as_deref(),
        }
    }
}

impl From<TextToImageRequest> for Request {
    fn from(request: TextToImageRequest) -> Self {
        Request::TextToImage(request)
    }
}

impl From<CompletionRequest> for Request {
    fn from(request: CompletionRequest) -> Self {
        Request::Completion(request)
    }
}
