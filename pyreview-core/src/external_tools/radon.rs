//! Radon Complexity Analyzer Integration
//!
//! Runs `radon raw -j` and `radon cc -j --order LINES` on one scratch file
//! and maps the JSON (keyed by path) onto [`ComplexityMetrics`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::process::{self, ScratchFile};
use super::{Analyzer, ToolError};
use crate::models::complexity::{ComplexityMetrics, ComplexityUnit, RawMetrics};
use crate::models::source::SourceCode;
use crate::{ReviewConfig, ToolCommand};

/// `cc` sorts by descending score unless told otherwise
const CC_ORDER: [&str; 2] = ["--order", "LINES"];

pub struct RadonIntegration {
    command: ToolCommand,
    timeout: Duration,
    scratch_dir: Option<PathBuf>,
}

impl RadonIntegration {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            command: config.tools.radon.clone(),
            timeout: config.timeout(),
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    async fn run_subcommand<T: DeserializeOwned>(
        &self,
        subcommand: &str,
        options: &[&str],
        path: &Path,
    ) -> Result<T, ToolError> {
        let mut command = self.command.command();
        command.arg(subcommand).arg("-j").args(options).arg(path);

        let output =
            process::run_with_timeout(command, &self.command.program, None, self.timeout).await?;
        if !output.status.success() && output.stdout.trim().is_empty() {
            return Err(output.into_failure());
        }

        let entry = single_entry(&output.stdout)?;
        serde_json::from_value(entry).map_err(|e| {
            warn!("Unexpected radon {} output: {}", subcommand, e);
            ToolError::Output(format!("radon {subcommand}: {e}"))
        })
    }
}

/// The value of the only entry in radon's path-keyed JSON.
///
/// An entry of the form `{"error": "..."}` means radon could not parse the
/// source.
pub fn single_entry(stdout: &str) -> Result<Value, ToolError> {
    let parsed: serde_json::Map<String, Value> = serde_json::from_str(stdout)
        .map_err(|e| ToolError::Parse(format!("malformed radon output: {e}")))?;

    let entry = parsed
        .into_iter()
        .next()
        .map(|(_, value)| value)
        .ok_or_else(|| ToolError::Output("radon reported no files".to_string()))?;

    if let Some(message) = entry.get("error") {
        let message = message
            .as_str()
            .map_or_else(|| message.to_string(), ToString::to_string);
        return Err(ToolError::Parse(message));
    }

    Ok(entry)
}

#[async_trait::async_trait]
impl Analyzer for RadonIntegration {
    type Output = ComplexityMetrics;

    fn tool_name(&self) -> &'static str {
        "radon"
    }

    async fn is_available(&self) -> bool {
        self.get_version().await.is_ok()
    }

    async fn get_version(&self) -> Result<String, ToolError> {
        super::probe_version(&self.command, self.timeout).await
    }

    async fn invoke(&self, source: &SourceCode) -> Result<ComplexityMetrics, ToolError> {
        let scratch = ScratchFile::create(source.text(), self.scratch_dir.as_deref())?;
        debug!(
            "Running radon on {} ({})",
            scratch.path().display(),
            source.origin()
        );

        let raw = self
            .run_subcommand::<RawMetrics>("raw", &[], scratch.path())
            .await;
        let units = if raw.is_ok() {
            self.run_subcommand::<Vec<ComplexityUnit>>("cc", &CC_ORDER, scratch.path())
                .await
        } else {
            Ok(Vec::new())
        };
        scratch.release();

        let metrics = ComplexityMetrics::new(raw?, units?);
        debug!(
            "radon found {} units, average complexity {:?}",
            metrics.units.len(),
            metrics.average_complexity()
        );
        Ok(metrics)
    }
}
