//! External Tool Integration System
//!
//! Each analyzer (flake8, black, radon) sits behind the [`Analyzer`] trait:
//! it receives the submitted source, runs the tool with a hard timeout and
//! translates the tool's native output into the normalized model, or into a
//! typed [`ToolError`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{complexity::ComplexityMetrics, source::SourceCode, style::StyleReport};
use crate::{ReviewConfig, ToolCommand};

pub mod black;
pub mod flake8;
pub mod process;
pub mod radon;

#[cfg(test)]
pub(crate) mod testing;

/// Failure of a single tool invocation
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program could not be started (missing, not executable)
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error around the invocation (scratch file, pipes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool did not finish in time and was killed
    #[error("timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The tool exited with an unexpected status or reported an error
    #[error("{stderr} ({status})")]
    Failed { status: String, stderr: String },

    /// The tool could not parse the submitted source
    #[error("{0}")]
    Parse(String),

    /// The tool's output did not have the expected shape
    #[error("unexpected output: {0}")]
    Output(String),
}

impl ToolError {
    /// Source is not syntactically valid for the tool
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Base trait for all analyzer adapters
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    type Output: Send;

    /// Get the tool name
    fn tool_name(&self) -> &'static str;

    /// Check if the tool can be launched
    async fn is_available(&self) -> bool;

    /// Get the tool version
    async fn get_version(&self) -> Result<String, ToolError>;

    /// Run the tool on one source
    async fn invoke(&self, source: &SourceCode) -> Result<Self::Output, ToolError>;
}

pub type StyleAnalyzer = Arc<dyn Analyzer<Output = StyleReport>>;
pub type FormatAnalyzer = Arc<dyn Analyzer<Output = String>>;
pub type ComplexityAnalyzer = Arc<dyn Analyzer<Output = ComplexityMetrics>>;

/// Run `<program> <args> --version` and return its first non-empty line
pub(crate) async fn probe_version(
    tool: &ToolCommand,
    limit: std::time::Duration,
) -> Result<String, ToolError> {
    let mut command = tool.command();
    command.arg("--version");

    let output = process::run_with_timeout(command, &tool.program, None, limit).await?;
    if !output.status.success() {
        return Err(output.into_failure());
    }

    // Some tools print their version on stderr
    let text = if output.stdout.trim().is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    Ok(text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string())
}

/// Availability report for one tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    pub tool: String,
    pub program: String,
    pub resolved_path: Option<PathBuf>,
    pub version: Option<String>,
    pub error: Option<String>,
}

impl ToolStatus {
    pub const fn is_available(&self) -> bool {
        self.version.is_some()
    }
}

/// Holds the three adapters built from one configuration
#[derive(Clone)]
pub struct ToolManager {
    pub style: StyleAnalyzer,
    pub formatter: FormatAnalyzer,
    pub complexity: ComplexityAnalyzer,
    config: ReviewConfig,
}

impl ToolManager {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            style: Arc::new(flake8::Flake8Integration::new(config)),
            formatter: Arc::new(black::BlackIntegration::new(config)),
            complexity: Arc::new(radon::RadonIntegration::new(config)),
            config: config.clone(),
        }
    }

    /// Replace the adapters, e.g. with stand-ins in tests
    pub fn with_analyzers(
        config: &ReviewConfig,
        style: StyleAnalyzer,
        formatter: FormatAnalyzer,
        complexity: ComplexityAnalyzer,
    ) -> Self {
        Self {
            style,
            formatter,
            complexity,
            config: config.clone(),
        }
    }

    pub const fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Check availability of all three tools
    pub async fn check_tool_availability(&self) -> Vec<ToolStatus> {
        info!("Checking external tool availability...");

        let tools = &self.config.tools;
        let (style, formatter, complexity) = tokio::join!(
            self.status_of(self.style.tool_name(), &tools.flake8, self.style.get_version()),
            self.status_of(self.formatter.tool_name(), &tools.black, self.formatter.get_version()),
            self.status_of(
                self.complexity.tool_name(),
                &tools.radon,
                self.complexity.get_version()
            ),
        );

        vec![style, formatter, complexity]
    }

    async fn status_of<F>(&self, tool: &str, command: &ToolCommand, version: F) -> ToolStatus
    where
        F: std::future::Future<Output = Result<String, ToolError>> + Send,
    {
        let resolved_path = which::which(&command.program).ok();
        let mut status = ToolStatus {
            tool: tool.to_string(),
            program: command.program.clone(),
            resolved_path,
            version: None,
            error: None,
        };

        match version.await {
            Ok(version) => {
                debug!("{} is available: {}", tool, version);
                status.version = Some(version);
            }
            Err(e) => {
                warn!("{} is not available: {}", tool, e);
                status.error = Some(e.to_string());
            }
        }

        status
    }
}
