//! Flat configuration object handed to every extension loader.
//!
//! Loaders read the keys they declare and nothing else. Missing keys and
//! `null` fall back to the declared default; a value of the wrong type is
//! ignored with a warning.

use crate::error::{RegistryError, RegistryResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Key listing the active extension names
pub const EXTENSIONS_KEY: &str = "extensions";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionConfig(Map<String, Value>);

impl ExtensionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> RegistryResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(RegistryError::InvalidConfig(type_name(&other).to_string())),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Active extension names, `None` when the key is absent or null
    pub fn extensions(&self) -> Option<Vec<String>> {
        self.get(EXTENSIONS_KEY)
            .map(|_| self.string_list(EXTENSIONS_KEY, &[]))
    }

    pub fn boolean(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(value)) => *value,
            Some(other) => ignored(key, "boolean", other, default),
        }
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            None => default.to_string(),
            Some(Value::String(value)) => value.clone(),
            Some(other) => ignored(key, "string", other, default.to_string()),
        }
    }

    pub fn string_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        let fallback = || default.iter().map(|s| s.to_string()).collect();
        match self.get(key) {
            None => fallback(),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(other) => ignored(key, "list of strings", other, fallback()),
        }
    }

    /// Structured (`json`) option deserialized into `T`
    pub fn json<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            None => default,
            Some(value) => match T::deserialize(value) {
                Ok(parsed) => parsed,
                Err(_) => ignored(key, std::any::type_name::<T>(), value, default),
            },
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ExtensionConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn ignored<T>(key: &str, expected: &str, found: &Value, default: T) -> T {
    warn!(key, expected, found = type_name(found), "Ignoring configuration value of unexpected type");
    default
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
