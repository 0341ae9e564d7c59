//! Aggregated report and its Markdown rendering

use chrono::{DateTime, Utc};
use pyreview_core::{ComplexityMetrics, Section, SourceCode, StyleReport};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// File name offered when the report is downloaded
pub const EXPORT_FILE_NAME: &str = "code_analysis_report.md";

/// MIME type of the exported report
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Shown for any summary field the complexity tool could not provide
const NOT_AVAILABLE: &str = "N/A";

/// Headline numbers taken from the complexity section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub loc: Option<u64>,
    pub lloc: Option<u64>,
    pub function_count: Option<usize>,
    pub average_complexity: Option<f64>,
}

impl SummaryRecord {
    /// Every field is `None` when the complexity section is degraded
    pub fn from_complexity(section: &Section<ComplexityMetrics>) -> Self {
        section.complete().map_or_else(Self::default, |metrics| Self {
            loc: Some(metrics.raw.loc),
            lloc: Some(metrics.raw.lloc),
            function_count: Some(metrics.function_count()),
            average_complexity: metrics.average_complexity(),
        })
    }

    pub fn loc_text(&self) -> String {
        display_or_na(self.loc)
    }

    pub fn lloc_text(&self) -> String {
        display_or_na(self.lloc)
    }

    pub fn function_count_text(&self) -> String {
        display_or_na(self.function_count)
    }

    /// Two decimals, or `N/A`
    pub fn average_complexity_text(&self) -> String {
        self.average_complexity
            .map_or_else(|| NOT_AVAILABLE.to_string(), |avg| format!("{avg:.2}"))
    }
}

fn display_or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Result of one analyze action. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source: SourceCode,
    pub style: Section<StyleReport>,
    pub formatting: Section<String>,
    pub complexity: Section<ComplexityMetrics>,
    pub summary: SummaryRecord,
    pub complexity_text: String,
    pub markdown: String,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl AnalysisReport {
    /// Derive the summary, section texts and Markdown from the three sections
    pub fn assemble(
        source: SourceCode,
        style: Section<StyleReport>,
        formatting: Section<String>,
        complexity: Section<ComplexityMetrics>,
        elapsed: Duration,
    ) -> Self {
        let summary = SummaryRecord::from_complexity(&complexity);
        let complexity_text = complexity.render_with(ComplexityMetrics::render_section);
        let style_text = style.render_with(|report| report.text().to_string());
        let formatted_text = formatting.render_with(Clone::clone);
        let markdown = render_markdown(&summary, &style_text, &complexity_text, &formatted_text);

        Self {
            source,
            style,
            formatting,
            complexity,
            summary,
            complexity_text,
            markdown,
            generated_at: Utc::now(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Style section text: diagnostics, the all-clear sentinel, or the error
    pub fn style_text(&self) -> String {
        self.style.render_with(|report| report.text().to_string())
    }

    /// Formatting section text: reformatted source, or the error
    pub fn formatted_text(&self) -> String {
        self.formatting.render_with(Clone::clone)
    }

    /// Number of sections whose tool failed
    pub fn degraded_sections(&self) -> usize {
        [
            self.style.is_degraded(),
            self.formatting.is_degraded(),
            self.complexity.is_degraded(),
        ]
        .into_iter()
        .filter(|degraded| *degraded)
        .count()
    }
}

/// Render the downloadable report. Sections always appear in this order.
pub fn render_markdown(
    summary: &SummaryRecord,
    style_text: &str,
    complexity_text: &str,
    formatted_text: &str,
) -> String {
    let lines = [
        "# Code Analysis Report\n".to_string(),
        "## 📊 Summary\n".to_string(),
        format!("* **Total Lines of Code (LOC):** {}", summary.loc_text()),
        format!("* **Logical Lines of Code (LLOC):** {}", summary.lloc_text()),
        format!("* **Functions/Methods Found:** {}", summary.function_count_text()),
        format!("* **Average Complexity:** {}\n", summary.average_complexity_text()),
        "## 🎨 Style Report (flake8)\n".to_string(),
        "```".to_string(),
        style_text.to_string(),
        "```\n".to_string(),
        "## 🔬 Complexity Report (radon)\n".to_string(),
        complexity_text.to_string(),
        "## ✨ Recommended Formatting (black)\n".to_string(),
        "```python".to_string(),
        formatted_text.to_string(),
        "```".to_string(),
    ];

    lines.join("\n")
}

/// Export formats for a finished report
pub struct AnalysisExporter;

impl AnalysisExporter {
    /// Export the report to JSON
    pub fn to_json(report: &AnalysisReport) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// The Markdown document offered for download
    pub fn to_markdown(report: &AnalysisReport) -> &str {
        &report.markdown
    }
}
