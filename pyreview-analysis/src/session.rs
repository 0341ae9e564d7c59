//! Per-session store for the latest report

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::report::AnalysisReport;

/// Where a session is in its analyze cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    Analyzing,
    Populated,
}

/// Holds the most recent complete report for one user session.
///
/// The report is swapped as a whole; readers get an `Arc` snapshot and never
/// observe a partially updated report.
#[derive(Debug, Default)]
pub struct SessionState {
    report: RwLock<Option<Arc<AnalysisReport>>>,
    in_flight: AtomicUsize,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored report
    pub async fn current(&self) -> Option<Arc<AnalysisReport>> {
        self.report.read().await.clone()
    }

    /// Store `report`, dropping whatever was there
    pub async fn replace(&self, report: AnalysisReport) -> Arc<AnalysisReport> {
        let report = Arc::new(report);
        let previous = self.report.write().await.replace(Arc::clone(&report));
        debug!(
            "Stored report for {} (replaced previous: {})",
            report.source.origin(),
            previous.is_some()
        );
        report
    }

    pub async fn clear(&self) {
        if self.report.write().await.take().is_some() {
            debug!("Cleared stored report");
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            SessionPhase::Analyzing
        } else if self.report.read().await.is_some() {
            SessionPhase::Populated
        } else {
            SessionPhase::Empty
        }
    }

    /// Mark an analysis as running until the guard is dropped
    pub(crate) fn begin_analysis(&self) -> AnalyzingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        AnalyzingGuard { session: self }
    }
}

pub(crate) struct AnalyzingGuard<'a> {
    session: &'a SessionState,
}

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
