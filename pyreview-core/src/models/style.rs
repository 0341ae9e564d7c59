//! Style checker output

use serde::{Deserialize, Serialize};

/// Text shown when the style checker ran and reported nothing
pub const CLEAN_SENTINEL: &str = "✅ All clear! No style issues found.";

/// Normalized style checker output.
///
/// Diagnostic text is opaque; it has already had the scratch file path
/// replaced by the placeholder name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum StyleReport {
    Clean,
    Diagnostics(String),
}

impl StyleReport {
    /// Build from raw checker stdout (already scrubbed)
    pub fn from_output(stdout: String) -> Self {
        if stdout.trim().is_empty() {
            Self::Clean
        } else {
            Self::Diagnostics(stdout)
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Clean => CLEAN_SENTINEL,
            Self::Diagnostics(text) => text,
        }
    }

    /// Number of diagnostic lines
    pub fn issue_count(&self) -> usize {
        match self {
            Self::Clean => 0,
            Self::Diagnostics(text) => text.lines().filter(|l| !l.trim().is_empty()).count(),
        }
    }
}
