use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lookup key for precomputed results.
///
/// Backed by a `serde_json::Map`, which keeps keys sorted, so the canonical
/// string does not depend on the order fields were inserted in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(Map<String, Value>);

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn canonical(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for CacheKey {
    fn from(map: Map<String, Value>) -> Self {
        CacheKey(map)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
