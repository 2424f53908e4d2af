use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::error::AggregateError;
use crate::executor::types::ExecutionResult;
use crate::registry::SnippetEntry;

use super::{Report, ReportEntry};

/// Sole writer of report state for one run.
///
/// Results may arrive in completion order; each carries its selection index and the
/// finalized report is ordered by that index.
pub struct ResultAggregator {
    run_id: String,
    started_at: chrono::DateTime<Utc>,
    clock: Instant,
    slots: Vec<(usize, ReportEntry)>,
    seen: HashSet<String>,
    taken: HashSet<usize>,
    next_index: usize,
    closed: bool,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::with_run_id(Uuid::new_v4().to_string())
    }

    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            clock: Instant::now(),
            slots: Vec::new(),
            seen: HashSet::new(),
            taken: HashSet::new(),
            next_index: 0,
            closed: false,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Append a result in call order.
    pub fn record(
        &mut self,
        entry: SnippetEntry,
        result: ExecutionResult,
    ) -> Result<(), AggregateError> {
        let index = self.next_index;
        self.record_at(index, entry, result)
    }

    /// Record a result for the snippet at selection position `index`.
    pub fn record_at(
        &mut self,
        index: usize,
        entry: SnippetEntry,
        result: ExecutionResult,
    ) -> Result<(), AggregateError> {
        if self.closed {
            return Err(AggregateError::ClosedReport);
        }
        if result.snippet_id != entry.id {
            return Err(AggregateError::Mismatch {
                entry_id: entry.id,
                result_id: result.snippet_id,
            });
        }
        if self.seen.contains(&entry.id) {
            return Err(AggregateError::DuplicateRecord(entry.id));
        }
        if !self.taken.insert(index) {
            return Err(AggregateError::IndexTaken {
                index,
                entry_id: entry.id,
            });
        }
        self.seen.insert(entry.id.clone());

        self.next_index = self.next_index.max(index + 1);
        self.slots.push((
            index,
            ReportEntry {
                snippet: entry,
                result,
            },
        ));
        Ok(())
    }

    pub fn recorded(&self) -> usize {
        self.slots.len()
    }

    /// Close the aggregator and hand out the report. Later calls fail with `ClosedReport`.
    pub fn finalize(&mut self) -> Result<Report, AggregateError> {
        if self.closed {
            return Err(AggregateError::ClosedReport);
        }
        self.closed = true;

        let mut slots = std::mem::take(&mut self.slots);
        slots.sort_by_key(|(index, _)| *index);

        Ok(Report::new(
            self.run_id.clone(),
            self.started_at,
            self.clock.elapsed().as_millis() as u64,
            slots.into_iter().map(|(_, entry)| entry).collect(),
        ))
    }
}
