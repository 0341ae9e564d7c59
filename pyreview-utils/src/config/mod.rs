//! Configuration utilities
//!
//! Configuration files may be TOML, JSON or YAML; the format is picked from
//! the file extension. Layers are merged as JSON values so a partial file
//! only overrides the keys it mentions.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::UtilError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yml" | "yaml" => Ok(Self::Yaml),
            _ => Err(UtilError::Config(format!(
                "Unsupported config format: '{}' ({})",
                extension,
                path.display()
            ))),
        }
    }

    /// Parse configuration text into a JSON value
    pub fn parse(self, content: &str) -> crate::Result<serde_json::Value> {
        match self {
            Self::Toml => {
                let toml_value: toml::Value = toml::from_str(content)
                    .map_err(|e| UtilError::Config(format!("TOML parse error: {e}")))?;
                serde_json::to_value(toml_value)
                    .map_err(|e| UtilError::Config(format!("TOML conversion error: {e}")))
            }
            Self::Json => serde_json::from_str(content)
                .map_err(|e| UtilError::Config(format!("JSON parse error: {e}"))),
            Self::Yaml => serde_yaml::from_str(content)
                .map_err(|e| UtilError::Config(format!("YAML parse error: {e}"))),
        }
    }
}

/// Read a configuration file into an untyped JSON value
pub fn load_value(path: &Path) -> crate::Result<serde_json::Value> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

fn merge_value_into<T>(base: &mut T, override_value: serde_json::Value) -> crate::Result<()>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut base_value = to_value(&*base)?;
    merge_json_values(&mut base_value, override_value);

    *base = serde_json::from_value(base_value)
        .map_err(|e| UtilError::Serialization(format!("Result deserialization error: {e}")))?;

    Ok(())
}

fn to_value<T: Serialize>(config: &T) -> crate::Result<serde_json::Value> {
    serde_json::to_value(config)
        .map_err(|e| UtilError::Serialization(format!("Config serialization error: {e}")))
}

/// Merge two JSON values (second overrides first, objects merge key by key)
fn merge_json_values(base: &mut serde_json::Value, override_value: serde_json::Value) {
    match (base, override_value) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(override_obj)) => {
            for (key, value) in override_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

/// Layered configuration: defaults, then files, then explicit overrides
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    config: T,
}

impl<T> ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    /// Create new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: T::default(),
        }
    }

    /// Merge a configuration file over the current layers
    pub fn load_file(mut self, path: &Path) -> crate::Result<Self> {
        let file_value = load_value(path)?;
        merge_value_into(&mut self.config, file_value)?;
        Ok(self)
    }

    /// Merge a configuration file if one was given
    pub fn load_optional_file(self, path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => self.load_file(path),
            None => Ok(self),
        }
    }

    /// Merge a partial override expressed as JSON
    pub fn merge_value(mut self, value: serde_json::Value) -> crate::Result<Self> {
        merge_value_into(&mut self.config, value)?;
        Ok(self)
    }

    /// Finish building
    pub fn build(self) -> crate::Result<T> {
        Ok(self.config)
    }
}

impl<T> Default for ConfigBuilder<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    fn default() -> Self {
        Self::new()
    }
}
