use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::types::ExecutionStatus;

/// Progress display for a run: one overall bar plus a spinner per in-flight snippet.
///
/// Draws to stderr. When disabled every method is a no-op.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    snippet_bars: HashMap<String, ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_snippets: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                snippet_bars: HashMap::new(),
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_snippets as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} snippets {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );

        Self {
            multi,
            overall,
            snippet_bars: HashMap::new(),
            enabled: true,
        }
    }

    pub fn start_snippet(&mut self, snippet_id: &str) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(snippet_id.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.snippet_bars.insert(snippet_id.to_string(), bar);
    }

    pub fn complete_snippet(&mut self, snippet_id: &str, status: ExecutionStatus, duration_ms: u64) {
        if !self.enabled {
            return;
        }

        if let Some(bar) = self.snippet_bars.remove(snippet_id) {
            bar.finish_and_clear();
        }
        self.overall.set_message(format!("{snippet_id} {status} ({duration_ms}ms)"));
        self.overall.inc(1);
    }

    pub fn finish(&self, all_success: bool) {
        if !self.enabled {
            return;
        }
        let msg = if all_success { "all passed" } else { "some snippets failed" };
        self.overall.finish_with_message(msg);
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        for (_, bar) in self.snippet_bars.drain() {
            bar.finish_and_clear();
        }
    }
}
