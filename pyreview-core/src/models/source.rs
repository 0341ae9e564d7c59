//! Submitted source code

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Python source submitted for one analysis run.
///
/// Immutable once captured; clones share the same buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCode {
    text: Arc<str>,
    origin: String,
}

impl SourceCode {
    /// Source pasted by the user
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            origin: "pasted".to_string(),
        }
    }

    /// Label the source with where it came from (upload name, file path)
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// True for empty or whitespace-only input
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

impl From<&str> for SourceCode {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceCode {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(SourceCode::new("").is_blank());
        assert!(SourceCode::new("  \n\t\r\n").is_blank());
        assert!(!SourceCode::new("x = 1\n").is_blank());
    }

    #[test]
    fn test_origin_label() {
        let source = SourceCode::new("pass\n");
        assert_eq!(source.origin(), "pasted");

        let source = source.with_origin("module.py");
        assert_eq!(source.origin(), "module.py");
        assert_eq!(source.text(), "pass\n");
    }

    #[test]
    fn test_clones_share_buffer() {
        let source = SourceCode::new("def f():\n    return 1\n");
        let clone = source.clone();
        assert!(std::ptr::eq(source.text(), clone.text()));
        assert_eq!(clone.line_count(), 2);
    }
}
