//! Review Pipeline - joins the three analyzers into one report
//!
//! Validation happens before any tool is started. After that the pipeline
//! never fails: every adapter error is folded into a degraded section.

use pyreview_core::{
    Analyzer, ComplexityMetrics, Error, ReviewConfig, Section, SourceCode, StyleReport,
    ToolManager, EMPTY_INPUT_MESSAGE,
};
use pyreview_utils::logging::{get_logger, Logger};
use std::sync::Arc;
use std::time::Instant;

use crate::report::AnalysisReport;
use crate::session::SessionState;
use crate::Result;

type Sections = (
    Section<StyleReport>,
    Section<String>,
    Section<ComplexityMetrics>,
);

/// Aggregates style, formatting and complexity results for one source
#[derive(Clone)]
pub struct ReviewPipeline {
    tools: ToolManager,
    parallel_execution: bool,
}

impl ReviewPipeline {
    /// Pipeline over the real tools described by `config`
    pub fn new(config: &ReviewConfig) -> Self {
        Self::with_tools(ToolManager::new(config))
    }

    pub fn with_tools(tools: ToolManager) -> Self {
        let parallel_execution = tools.config().parallel_execution;
        Self {
            tools,
            parallel_execution,
        }
    }

    /// Enable or disable concurrent tool execution
    #[must_use]
    pub fn with_parallel_execution(mut self, parallel: bool) -> Self {
        self.parallel_execution = parallel;
        self
    }

    pub const fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Reject empty or whitespace-only input
    pub fn validate(source: &SourceCode) -> Result<()> {
        if source.is_blank() {
            return Err(Error::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Run all three analyzers and build the report
    pub async fn analyze(&self, source: SourceCode) -> Result<AnalysisReport> {
        Self::validate(&source)?;

        let logger = get_logger("pyreview.analysis.pipeline");
        let start_time = Instant::now();
        logger.info(&format!(
            "Starting analysis of {} ({} lines, {})",
            source.origin(),
            source.line_count(),
            if self.parallel_execution {
                "parallel"
            } else {
                "sequential"
            }
        ));

        let (style, formatting, complexity) = if self.parallel_execution {
            self.run_parallel(&source, &logger).await
        } else {
            self.run_sequential(&source, &logger).await
        };

        let report =
            AnalysisReport::assemble(source, style, formatting, complexity, start_time.elapsed());

        logger.info(&format!(
            "Analysis completed in {}ms with {} degraded section(s)",
            report.duration_ms,
            report.degraded_sections()
        ));

        Ok(report)
    }

    /// Analyze and store the result in `session`.
    ///
    /// Blank input is rejected before the session is touched.
    pub async fn analyze_into(
        &self,
        session: &SessionState,
        source: SourceCode,
    ) -> Result<Arc<AnalysisReport>> {
        Self::validate(&source)?;

        let _analyzing = session.begin_analysis();
        let report = self.analyze(source).await?;
        Ok(session.replace(report).await)
    }

    async fn run_parallel(&self, source: &SourceCode, logger: &Logger) -> Sections {
        tokio::join!(
            run_section(&self.tools.style, source, logger),
            run_section(&self.tools.formatter, source, logger),
            run_section(&self.tools.complexity, source, logger),
        )
    }

    async fn run_sequential(&self, source: &SourceCode, logger: &Logger) -> Sections {
        let style = run_section(&self.tools.style, source, logger).await;
        let formatting = run_section(&self.tools.formatter, source, logger).await;
        let complexity = run_section(&self.tools.complexity, source, logger).await;
        (style, formatting, complexity)
    }
}

/// Invoke one analyzer and fold its result into a section
async fn run_section<T>(
    analyzer: &Arc<dyn Analyzer<Output = T>>,
    source: &SourceCode,
    logger: &Logger,
) -> Section<T>
where
    T: Send,
{
    let tool = analyzer.tool_name();
    let started = Instant::now();
    let result = analyzer.invoke(source).await;

    match &result {
        Ok(_) => logger.debug(&format!("{tool} finished in {:?}", started.elapsed())),
        Err(e) => logger.warning(&format!(
            "{tool} failed after {:?}, section degraded: {e}",
            started.elapsed()
        )),
    }

    Section::from_result(result, tool)
}
