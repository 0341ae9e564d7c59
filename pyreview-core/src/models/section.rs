//! Report sections that either hold content or a degradation reason

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One report section. An adapter failure never aborts the report; it turns
/// the section into `Degraded` with a readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "content", rename_all = "snake_case")]
pub enum Section<T> {
    Complete(T),
    Degraded(String),
}

impl<T> Section<T> {
    /// Convert an adapter result, naming the tool in the failure text
    pub fn from_result<E: Display>(result: Result<T, E>, tool: &str) -> Self {
        match result {
            Ok(content) => Self::Complete(content),
            Err(e) => Self::Degraded(format!("Error running {tool}: {e}")),
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub const fn complete(&self) -> Option<&T> {
        match self {
            Self::Complete(content) => Some(content),
            Self::Degraded(_) => None,
        }
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded(reason) => Some(reason),
        }
    }

    /// Section text: the content rendered by `render`, or the reason
    pub fn render_with<F>(&self, render: F) -> String
    where
        F: FnOnce(&T) -> String,
    {
        match self {
            Self::Complete(content) => render(content),
            Self::Degraded(reason) => reason.clone(),
        }
    }
}
