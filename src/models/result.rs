use serde::{Deserialize, Serialize};

/// One generated output. Image completions carry no text, only a file location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub text: String,
    pub logprob: f64,
    pub tokens: Vec<String>,
    pub file_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestResult {
    pub success: bool,
    pub cached: bool,
    pub error: Option<String>,
    pub completions: Vec<Sequence>,
    pub embedding: Vec<f32>,
    pub request_time: Option<f64>,
    pub request_datetime: Option<i64>,
}

impl Sequence {
    pub fn image(file_location: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            logprob: 0.0,
            tokens: Vec::new(),
            file_location: Some(file_location.into()),
        }
    }
}

impl RequestResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            cached: false,
            error: Some(error.into()),
            completions: Vec::new(),
            embedding: Vec::new(),
            request_time: None,
            request_datetime: None,
        }
    }
}
