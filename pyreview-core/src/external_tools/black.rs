//! Black Formatter Integration
//!
//! The source is streamed on stdin and the reformatted text read back from
//! stdout; nothing touches the filesystem.

use std::time::Duration;
use tracing::debug;

use super::{process, Analyzer, ToolError};
use crate::models::source::SourceCode;
use crate::{ReviewConfig, ToolCommand};

pub struct BlackIntegration {
    command: ToolCommand,
    timeout: Duration,
}

impl BlackIntegration {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            command: config.tools.black.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait::async_trait]
impl Analyzer for BlackIntegration {
    type Output = String;

    fn tool_name(&self) -> &'static str {
        "black"
    }

    async fn is_available(&self) -> bool {
        self.get_version().await.is_ok()
    }

    async fn get_version(&self) -> Result<String, ToolError> {
        super::probe_version(&self.command, self.timeout).await
    }

    async fn invoke(&self, source: &SourceCode) -> Result<String, ToolError> {
        debug!("Running black on {} ({} lines)", source.origin(), source.line_count());

        let mut command = self.command.command();
        command.args(["--quiet", "-"]);
        let output = process::run_with_timeout(
            command,
            &self.command.program,
            Some(source.text()),
            self.timeout,
        )
        .await?;

        // With --quiet anything on stderr is an error
        if !output.stderr.trim().is_empty() || !output.status.success() {
            return Err(output.into_failure());
        }

        Ok(output.stdout)
    }
}
