use chrono::{DateTime, Utc};

use crate::executor::types::{ExecutionResult, ExecutionStatus};
use crate::registry::SnippetEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub snippet: SnippetEntry,
    pub result: ExecutionResult,
}

/// Outcome counts. Always derived from the entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub success: usize,
    pub failure: usize,
    pub timeout: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.success + self.failure + self.timeout
    }
}

/// Immutable outcome of one run, entries in selection order.
#[derive(Debug, Clone)]
pub struct Report {
    run_id: String,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    entries: Vec<ReportEntry>,
}

impl Report {
    pub(crate) fn new(
        run_id: String,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        entries: Vec<ReportEntry>,
    ) -> Self {
        Self {
            run_id,
            started_at,
            duration_ms,
            entries,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time between aggregator creation and finalization.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            match entry.result.status {
                ExecutionStatus::Success => summary.success += 1,
                ExecutionStatus::Failure => summary.failure += 1,
                ExecutionStatus::Timeout => summary.timeout += 1,
            }
        }
        summary
    }

    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|e| e.result.is_success())
    }
}
