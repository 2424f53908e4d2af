use std::sync::Mutex;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use crate::error::AggregateError;
use crate::registry::SnippetEntry;
use crate::report::{Report, ResultAggregator};

use super::cancel::CancelToken;
use super::engine::Executor;
use super::progress::ProgressMonitor;
use super::types::{ExecutionResult, RunOpts};

/// Run every snippet in `selection` and aggregate the results in selection order.
///
/// With `max_parallel <= 1` snippets run one after another and cancellation is checked
/// between them. Otherwise up to `max_parallel` run at once, each with its own
/// capabilities and timer; completions are recorded by selection index. Snippets the
/// run never starts because of cancellation are still reported.
#[tracing::instrument(
    name = "executor.run",
    skip_all,
    fields(snippets = selection.len(), max_parallel = opts.max_parallel)
)]
pub async fn run_snippets(
    executor: &Executor,
    selection: Vec<SnippetEntry>,
    opts: &RunOpts,
    cancel: &CancelToken,
) -> Result<Report, AggregateError> {
    let mut aggregator = ResultAggregator::new();
    let progress = Mutex::new(ProgressMonitor::new(selection.len(), opts.progress_bar));

    tracing::info!(
        run_id = %aggregator.run_id(),
        sandbox = %executor.sandbox_name(),
        "run start"
    );

    if opts.max_parallel <= 1 {
        for (index, entry) in selection.into_iter().enumerate() {
            let result = run_one(executor, &entry, cancel, &progress).await;
            aggregator.record_at(index, entry, result)?;
        }
    } else {
        let sem = Semaphore::new(opts.max_parallel);
        let mut futs: FuturesUnordered<_> = selection
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let sem = &sem;
                let progress = &progress;
                async move {
                    let result = match sem.acquire().await {
                        Ok(_permit) => run_one(executor, &entry, cancel, progress).await,
                        Err(_) => ExecutionResult::not_started(&entry.id),
                    };
                    (index, entry, result)
                }
            })
            .collect();

        // Single consumer: the aggregator is only ever touched from this loop.
        while let Some((index, entry, result)) = futs.next().await {
            aggregator.record_at(index, entry, result)?;
        }
    }

    let report = aggregator.finalize()?;
    if let Ok(monitor) = progress.lock() {
        monitor.finish(report.all_succeeded());
    }

    let summary = report.summary();
    tracing::info!(
        run_id = %report.run_id(),
        success = summary.success,
        failure = summary.failure,
        timeout = summary.timeout,
        duration_ms = report.duration_ms(),
        "run end"
    );
    Ok(report)
}

async fn run_one(
    executor: &Executor,
    entry: &SnippetEntry,
    cancel: &CancelToken,
    progress: &Mutex<ProgressMonitor>,
) -> ExecutionResult {
    if cancel.is_cancelled() {
        tracing::debug!(snippet_id = %entry.id, "skipping snippet: run cancelled");
        return ExecutionResult::not_started(&entry.id);
    }

    if let Ok(mut monitor) = progress.lock() {
        monitor.start_snippet(&entry.id);
    }
    let result = executor.execute_with_cancel(entry, cancel).await;
    if let Ok(mut monitor) = progress.lock() {
        monitor.complete_snippet(&entry.id, result.status, result.duration_ms);
    }
    result
}
