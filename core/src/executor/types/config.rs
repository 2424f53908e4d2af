use std::time::Duration;

use crate::config::AppConfig;
use crate::executor::capabilities::CapabilityTemplate;

/// Default per-snippet time budget.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Per-snippet execution options.
#[derive(Debug, Clone)]
pub struct ExecutorOpts {
    /// Time budget for a single snippet.
    pub timeout: Duration,

    /// Stubs handed (freshly instantiated) to every run.
    pub capabilities: CapabilityTemplate,
}

impl Default for ExecutorOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            capabilities: CapabilityTemplate::default(),
        }
    }
}

impl ExecutorOpts {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_millis(cfg.executor.timeout_ms.max(1)),
            capabilities: CapabilityTemplate::from_config(cfg),
        }
    }
}

/// Options for a whole run over a selection.
#[derive(Debug, Clone)]
pub struct RunOpts {
    /// Maximum snippets in flight. `1` runs sequentially.
    pub max_parallel: usize,

    /// Enable visual progress bar (stderr).
    pub progress_bar: bool,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            max_parallel: 1,
            progress_bar: false,
        }
    }
}
