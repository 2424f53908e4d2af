//! Stub capabilities injected into every snippet run.
//!
//! The demonstration material assumes ambient platform globals (console, clock,
//! `localStorage`/`sessionStorage`). Here they are explicit values created per run and
//! passed to the sandbox; nothing is shared between two runs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::AppConfig;
use crate::registry::SnippetEntry;

use super::types::CapturedOutput;

/// Default cap on captured lines per snippet.
pub const DEFAULT_MAX_OUTPUT_LINES: usize = 10_000;

pub const ENV_SNIPPET_ID: &str = "SNIPBOX_SNIPPET_ID";
pub const ENV_CATEGORY: &str = "SNIPBOX_CATEGORY";
pub const ENV_NOW_MS: &str = "SNIPBOX_NOW_MS";
pub const ENV_STORAGE_SEED: &str = "SNIPBOX_STORAGE_SEED";

/// Print sink. Every write a snippet makes ends up here, one entry per line.
#[derive(Debug, Clone)]
pub struct Console {
    inner: Arc<Mutex<CapturedOutput>>,
    max_lines: usize,
}

impl Console {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CapturedOutput::default())),
            max_lines,
        }
    }

    /// Append `text`, split on line breaks. Lines past the cap are counted, not kept.
    pub fn print(&self, text: impl AsRef<str>) {
        let mut out = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for line in text.as_ref().split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if out.lines.len() < self.max_lines {
                out.lines.push(line.to_string());
            } else {
                out.dropped += 1;
            }
        }
    }

    pub fn snapshot(&self) -> CapturedOutput {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Wall clock as seen by a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    /// Frozen at a fixed instant, for reproducible output.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn fixed_ms(epoch_ms: i64) -> Self {
        match Utc.timestamp_millis_opt(epoch_ms).single() {
            Some(at) => Self::Fixed(at),
            None => Self::System,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Timer stand-in. Always yields to the runtime so the run can be timed out.
    pub async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// In-memory key/value store with the shape of web storage.
#[derive(Debug, Clone, Default)]
pub struct StorageStub {
    inner: Arc<Mutex<BTreeMap<String, String>>>,
}

impl StorageStub {
    pub fn seeded(seed: &BTreeMap<String, String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(seed.clone())),
        }
    }

    fn map(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.map().get(key).cloned()
    }

    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.map().insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) -> Option<String> {
        self.map().remove(key)
    }

    pub fn clear(&self) {
        self.map().clear();
    }

    /// Key at `index` in key order.
    pub fn key(&self, index: usize) -> Option<String> {
        self.map().keys().nth(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.map().clone()
    }
}

/// Capabilities handed to one snippet run.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub console: Console,
    pub clock: Clock,
    pub local_storage: StorageStub,
    pub session_storage: StorageStub,
}

impl Capabilities {
    /// Environment for subprocess sandboxes, which cannot receive the stubs directly.
    pub fn env_vars(&self, snippet: &SnippetEntry) -> Vec<(String, String)> {
        let mut vars = vec![
            (ENV_SNIPPET_ID.to_string(), snippet.id.clone()),
            (ENV_CATEGORY.to_string(), snippet.category.clone()),
        ];
        if let Clock::Fixed(at) = self.clock {
            vars.push((ENV_NOW_MS.to_string(), at.timestamp_millis().to_string()));
        }
        let seed = self.local_storage.snapshot();
        if !seed.is_empty() {
            if let Ok(json) = serde_json::to_string(&seed) {
                vars.push((ENV_STORAGE_SEED.to_string(), json));
            }
        }
        vars
    }
}

/// Recipe for building fresh [`Capabilities`] for each run.
#[derive(Debug, Clone)]
pub struct CapabilityTemplate {
    pub max_output_lines: usize,
    pub clock: Clock,
    pub storage_seed: BTreeMap<String, String>,
}

impl Default for CapabilityTemplate {
    fn default() -> Self {
        Self {
            max_output_lines: DEFAULT_MAX_OUTPUT_LINES,
            clock: Clock::System,
            storage_seed: BTreeMap::new(),
        }
    }
}

impl CapabilityTemplate {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            max_output_lines: cfg.executor.max_output_lines,
            clock: cfg
                .sandbox
                .fake_now_ms
                .map(Clock::fixed_ms)
                .unwrap_or_default(),
            storage_seed: cfg.sandbox.storage_seed.clone(),
        }
    }

    pub fn instantiate(&self) -> Capabilities {
        Capabilities {
            console: Console::new(self.max_output_lines),
            clock: self.clock,
            local_storage: StorageStub::seeded(&self.storage_seed),
            session_storage: StorageStub::default(),
        }
    }
}
