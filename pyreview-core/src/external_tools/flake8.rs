//! Flake8 Style Checker Integration

use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use super::process::{self, ScratchFile};
use super::{Analyzer, ToolError};
use crate::models::{source::SourceCode, style::StyleReport};
use crate::{ReviewConfig, ToolCommand};

pub struct Flake8Integration {
    command: ToolCommand,
    timeout: Duration,
    placeholder: String,
    scratch_dir: Option<PathBuf>,
}

impl Flake8Integration {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            command: config.tools.flake8.clone(),
            timeout: config.timeout(),
            placeholder: config.placeholder_name.clone(),
            scratch_dir: config.scratch_dir.clone(),
        }
    }
}

/// Replace the scratch path, then its bare file name, with `placeholder`
pub fn scrub_paths(output: &str, path: &str, file_name: &str, placeholder: &str) -> String {
    let scrubbed = if path.is_empty() {
        output.to_string()
    } else {
        output.replace(path, placeholder)
    };

    if file_name.is_empty() {
        scrubbed
    } else {
        scrubbed.replace(file_name, placeholder)
    }
}

#[async_trait::async_trait]
impl Analyzer for Flake8Integration {
    type Output = StyleReport;

    fn tool_name(&self) -> &'static str {
        "flake8"
    }

    async fn is_available(&self) -> bool {
        self.get_version().await.is_ok()
    }

    async fn get_version(&self) -> Result<String, ToolError> {
        super::probe_version(&self.command, self.timeout).await
    }

    async fn invoke(&self, source: &SourceCode) -> Result<StyleReport, ToolError> {
        let scratch = ScratchFile::create(source.text(), self.scratch_dir.as_deref())?;
        let path = scratch.display_path();
        let file_name = scratch.file_name().unwrap_or_default().to_string();
        debug!("Running flake8 on {} ({})", path, source.origin());

        let mut command = self.command.command();
        command.arg(scratch.path());
        let result =
            process::run_with_timeout(command, &self.command.program, None, self.timeout).await;
        scratch.release();
        let output = result?;

        // 0 = clean, 1 = findings
        match output.code() {
            Some(0 | 1) => {}
            _ if output.stdout.trim().is_empty() => return Err(output.into_failure()),
            code => debug!("flake8 exited with {:?} but produced diagnostics", code),
        }

        let scrubbed = scrub_paths(&output.stdout, &path, &file_name, &self.placeholder);
        Ok(StyleReport::from_output(scrubbed))
    }
}
