//! Server-rendered HTML for the single page

use pulldown_cmark::{html, Event, Options, Parser};
use std::fmt::Write as _;

use pyreview_analysis::{AnalysisReport, SummaryRecord};

const TEMPLATE: &str = include_str!("templates/index.html");

/// What the page shows for one request
#[derive(Debug, Default, Clone, Copy)]
pub struct PageView<'a> {
    /// Stored report of the session, if any
    pub report: Option<&'a AnalysisReport>,
    /// Blocking error shown above the form
    pub error: Option<&'a str>,
    /// Text put back into the paste area
    pub draft: &'a str,
}

/// Render the whole page
pub fn render_page(view: &PageView<'_>) -> String {
    let error = view
        .error
        .map(|message| format!(r#"<div class="error">{}</div>"#, escape_html(message)))
        .unwrap_or_default();
    let results = view.report.map_or_else(
        || r#"<div class="info">Results will be displayed here after analysis.</div>"#.to_string(),
        render_results,
    );

    let draft = escape_html(view.draft);

    fill_template(
        TEMPLATE,
        &[
            ("{{ERROR}}", error.as_str()),
            ("{{DRAFT}}", draft.as_str()),
            ("{{RESULTS}}", results.as_str()),
        ],
    )
}

/// Substitute each marker once, in template order. Inserted values are never
/// scanned for markers.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    for (marker, value) in slots {
        if let Some(pos) = rest.find(marker) {
            out.push_str(&rest[..pos]);
            out.push_str(value);
            rest = &rest[pos + marker.len()..];
        }
    }

    out.push_str(rest);
    out
}

fn render_results(report: &AnalysisReport) -> String {
    let mut html = String::new();

    html.push_str("<p><strong>Summary Metrics</strong></p>\n");
    html.push_str(&build_metric_cards(&report.summary));

    html.push_str("<p><strong>Code Formatting (Before vs. After)</strong></p>\n");
    let _ = write!(
        html,
        r#"<div class="columns inner"><div><p>Before (Original)</p><pre><code class="language-python">{}</code></pre></div><div><p>After (Formatted by Black)</p><pre><code class="language-python">{}</code></pre></div></div>"#,
        escape_html(report.source.text()),
        escape_html(&report.formatted_text()),
    );
    html.push('\n');

    let _ = writeln!(
        html,
        "<details><summary>Show Style Report (flake8)</summary><pre>{}</pre></details>",
        escape_html(&report.style_text())
    );
    let _ = writeln!(
        html,
        "<details><summary>Show Complexity Report (radon)</summary>{}</details>",
        render_markdown_html(&report.complexity_text)
    );

    html.push_str(r#"<a class="export" href="/report.md" download>Export Full Report (.md)</a>"#);
    html.push('\n');
    html
}

fn build_metric_cards(summary: &SummaryRecord) -> String {
    let metrics = [
        ("Total LOC", summary.loc_text()),
        ("Logical LOC", summary.lloc_text()),
        ("Functions", summary.function_count_text()),
        ("Avg. Complexity", summary.average_complexity_text()),
    ];

    let mut cards = String::from(r#"<div class="metrics">"#);
    for (label, value) in metrics {
        let _ = write!(
            cards,
            r#"<div class="metric-card"><span class="label">{label}</span><span class="value">{}</span></div>"#,
            escape_html(&value)
        );
    }
    cards.push_str("</div>\n");
    cards
}

/// Markdown to HTML. Raw HTML in the input is shown as text.
pub fn render_markdown_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty()).map(|event| match event {
        Event::Html(text) => Event::Text(text),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
