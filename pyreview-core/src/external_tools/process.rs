//! Subprocess execution with a hard timeout, and scoped scratch files

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::ToolError;

/// Captured result of a finished tool
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Turn an unexpected exit into a `ToolError::Failed`
    pub fn into_failure(self) -> ToolError {
        let stderr = self.stderr.trim();
        let stderr = if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        };
        ToolError::Failed {
            status: self.status.to_string(),
            stderr,
        }
    }
}

/// Run `command` to completion, feeding `stdin` if given.
///
/// The child is killed if `limit` elapses first.
pub async fn run_with_timeout(
    mut command: Command,
    program: &str,
    stdin: Option<&str>,
    limit: Duration,
) -> Result<ToolOutput, ToolError> {
    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    // Feed stdin from a separate task so a tool that writes before it has
    // read everything cannot deadlock on a full pipe.
    if let (Some(mut pipe), Some(input)) = (child.stdin.take(), stdin) {
        let input = input.as_bytes().to_vec();
        let program = program.to_string();
        tokio::spawn(async move {
            if let Err(e) = pipe.write_all(&input).await {
                debug!("{} closed stdin early: {}", program, e);
            }
            // Dropping the pipe signals EOF
        });
    }

    match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
        Ok(Err(e)) => Err(ToolError::Io(e)),
        Err(_) => {
            warn!("{} timed out after {:?}; killed", program, limit);
            Err(ToolError::Timeout {
                seconds: limit.as_secs(),
            })
        }
    }
}

/// Source written to a uniquely named `.py` file for tools that only accept
/// paths. The file is deleted when the guard is dropped.
#[derive(Debug)]
pub struct ScratchFile {
    file: tempfile::NamedTempFile,
}

impl ScratchFile {
    /// Write `contents` to a fresh `pyreview-XXXXXX.py` file
    pub fn create(contents: &str, dir: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pyreview-").suffix(".py");

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Path as the tools will print it
    pub fn display_path(&self) -> String {
        self.file.path().to_string_lossy().into_owned()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.path().file_name().and_then(|name| name.to_str())
    }

    /// Delete now, logging instead of failing if removal goes wrong
    pub fn release(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to remove scratch file {}: {}", path.display(), e);
        }
    }
}
