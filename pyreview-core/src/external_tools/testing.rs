//! Shell scripts standing in for the real tools

use std::path::{Path, PathBuf};

use crate::{ReviewConfig, ToolCommand};

/// Write an executable `/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Config pointing every tool at `program` with scratch files under `scratch`
pub fn config_with(program: &Path, scratch: &Path, timeout_secs: u64) -> ReviewConfig {
    let command = ToolCommand::new(program.to_string_lossy());
    let mut config = ReviewConfig {
        timeout_secs,
        scratch_dir: Some(scratch.to_path_buf()),
        ..ReviewConfig::default()
    };
    config.tools.flake8 = command.clone();
    config.tools.black = command.clone();
    config.tools.radon = command;
    config
}

/// Number of entries left in a directory
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
