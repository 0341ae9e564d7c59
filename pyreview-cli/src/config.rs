//! Application configuration: defaults, then the config file, then flags

use serde::{Deserialize, Serialize};
use std::path::Path;

use pyreview_core::ReviewConfig;
use pyreview_utils::{ConfigBuilder, LoggerConfig};
use pyreview_web::ServerConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub review: ReviewConfig,
    pub server: ServerConfig,
    pub logging: LoggerConfig,
}

impl AppConfig {
    /// Layer `file` (if any) and then `overrides` over the defaults
    pub fn load(file: Option<&Path>, overrides: serde_json::Value) -> anyhow::Result<Self> {
        let config = ConfigBuilder::<Self>::new()
            .load_optional_file(file)?
            .merge_value(overrides)?
            .build()?;
        Ok(config)
    }
}
