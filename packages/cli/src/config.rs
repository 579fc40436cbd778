use anyhow::{Context, Result};
use folio_extensions::{ExtensionConfig, Registry, EXTENSIONS_KEY};
use folio_schema::Schema;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Load the configuration: `explicit` when given, otherwise
/// `folio.config.json` in `cwd`, otherwise an empty configuration
pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<ExtensionConfig> {
    let path = match explicit {
        Some(path) => cwd.join(path),
        None => {
            let path = cwd.join(DEFAULT_CONFIG_NAME);
            if !path.exists() {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_NAME);
                return Ok(ExtensionConfig::new());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
}

pub fn parse(content: &str) -> Result<ExtensionConfig> {
    let value: Value = serde_json::from_str(content)?;
    Ok(ExtensionConfig::from_value(value)?)
}

/// Active extension names; every registered extension when the
/// configuration does not list any
pub fn active_extensions(registry: &Registry, config: &ExtensionConfig) -> Vec<String> {
    config
        .extensions()
        .unwrap_or_else(|| registry.descriptors().iter().map(|d| d.name.clone()).collect())
}

pub async fn build_schema(cwd: &Path, explicit: Option<&Path>) -> Result<Arc<Schema>> {
    let config = load(cwd, explicit)?;
    let registry = Registry::new();
    let active = active_extensions(&registry, &config);
    let schema = registry.build_schema(&active, &config).await?;
    Ok(Arc::new(schema))
}

/// Configuration enabling every registered extension with its option defaults
pub fn default_config(registry: &Registry) -> Value {
    let mut map = Map::new();
    let names: Vec<Value> = registry.descriptors().iter().map(|d| Value::from(d.name.clone())).collect();
    map.insert(EXTENSIONS_KEY.to_string(), Value::Array(names));
    for descriptor in registry.descriptors() {
        for option in &descriptor.options {
            map.insert(option.field.clone(), option.default.clone());
        }
    }
    Value::Object(map)
}
