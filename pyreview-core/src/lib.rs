//! pyreview core - data model and analyzer adapters
//!
//! This crate provides:
//! - The data model shared by the pipeline and the presentation layer
//!   ([`SourceCode`], [`Section`], [`StyleReport`], [`ComplexityMetrics`])
//! - The [`Analyzer`] adapter trait and one adapter per external tool
//!   (flake8, black, radon)
//! - Subprocess execution with a hard timeout and scoped scratch files
//! - [`ReviewConfig`], the configuration consumed by all of the above

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions, // Often necessary for clarity
    clippy::missing_errors_doc,
)]

pub mod external_tools;
pub mod models;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use external_tools::{
    black::BlackIntegration, flake8::Flake8Integration, radon::RadonIntegration, Analyzer,
    ToolError, ToolManager, ToolStatus,
};
pub use models::{
    complexity::{ComplexityMetrics, ComplexityUnit, Rank, RawMetrics, UnitKind},
    section::Section,
    source::SourceCode,
    style::StyleReport,
};

/// Result type used throughout pyreview core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pyreview core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Submitted source was empty or whitespace only
    #[error("{0}")]
    Validation(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External tool error
    #[error("External tool error: {tool}: {source}")]
    ExternalTool {
        tool: String,
        #[source]
        source: ToolError,
    },

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] pyreview_utils::UtilError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Message shown when the user submits nothing to analyze
pub const EMPTY_INPUT_MESSAGE: &str = "Please upload a file or paste some code to analyze.";

/// How to launch one external tool.
///
/// `args` are inserted between `program` and the arguments the adapter adds,
/// so both `flake8 --max-line-length=100` and `python3 -m flake8` can be
/// expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// A `tokio` command with the configured prefix arguments applied
    pub fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self::new("")
    }
}

/// Commands for the three analyzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub flake8: ToolCommand,
    pub black: ToolCommand,
    pub radon: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            flake8: ToolCommand::new("flake8"),
            black: ToolCommand::new("black"),
            radon: ToolCommand::new("radon"),
        }
    }
}

/// Configuration for one review run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Per-invocation limit for each external tool
    pub timeout_secs: u64,
    /// Name substituted for the scratch file in style diagnostics
    pub placeholder_name: String,
    /// Run the three analyzers concurrently
    pub parallel_execution: bool,
    /// Directory for scratch files (system temp dir when unset)
    pub scratch_dir: Option<PathBuf>,
    pub tools: ToolsConfig,
}

impl ReviewConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            placeholder_name: "your_code.py".to_string(),
            parallel_execution: true,
            scratch_dir: None,
            tools: ToolsConfig::default(),
        }
    }
}
