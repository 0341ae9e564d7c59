//! pyreview analysis - report aggregation and session state
//!
//! This crate joins the three analyzer adapters into one
//! [`AnalysisReport`], renders the downloadable Markdown document and keeps
//! the per-session copy of the latest report.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod pipeline;
pub mod report;
pub mod session;

// Re-export main types for convenience
pub use pipeline::ReviewPipeline;
pub use report::{
    render_markdown, AnalysisExporter, AnalysisReport, SummaryRecord, EXPORT_FILE_NAME,
    MARKDOWN_MIME,
};
pub use session::{SessionPhase, SessionState};

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, pyreview_core::Error>;
