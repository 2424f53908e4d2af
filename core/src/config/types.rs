use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::executor::capabilities::DEFAULT_MAX_OUTPUT_LINES;
use crate::executor::types::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub sandbox: SandboxConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "warn" or "snipbox_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Snippet tree (or directory holding `snipbox.toml`). `~` is expanded.
    #[serde(default = "default_registry_root")]
    pub root: String,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Category for files directly under `root`.
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_registry_root() -> String {
    ".".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["js".into(), "mjs".into(), "cjs".into()]
}

fn default_category() -> String {
    "General".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: default_registry_root(),
            extensions: default_extensions(),
            default_category: default_category(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Snippets in flight at once; 0 means one per CPU.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    #[serde(default = "default_max_output_lines")]
    pub max_output_lines: usize,

    #[serde(default = "default_progress_bar")]
    pub progress_bar: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_parallel() -> usize {
    1
}

fn default_max_output_lines() -> usize {
    DEFAULT_MAX_OUTPUT_LINES
}

fn default_progress_bar() -> bool {
    true
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_parallel: default_max_parallel(),
            max_output_lines: default_max_output_lines(),
            progress_bar: default_progress_bar(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Interpreter the snippet source is piped into.
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Start the child from an empty environment (PATH is kept).
    #[serde(default)]
    pub clear_env: bool,

    /// Working directory for the child. Unset means a fresh temporary directory per run.
    #[serde(default)]
    pub workdir: Option<String>,

    /// Prepend the built-in capability shim when the program is `node`.
    #[serde(default = "default_inject_prelude")]
    pub inject_prelude: bool,

    /// Custom prelude file, used instead of the built-in shim.
    #[serde(default)]
    pub prelude_path: Option<String>,

    /// Freeze the snippet clock at this epoch (milliseconds).
    #[serde(default)]
    pub fake_now_ms: Option<i64>,

    /// Initial `localStorage` contents for every run.
    #[serde(default)]
    pub storage_seed: BTreeMap<String, String>,
}

fn default_program() -> String {
    "node".to_string()
}

fn default_inject_prelude() -> bool {
    true
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            env: HashMap::new(),
            clear_env: false,
            workdir: None,
            inject_prelude: default_inject_prelude(),
            prelude_path: None,
            fake_now_ms: None,
            storage_seed: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// "text" or "json"
    #[serde(default = "default_report_format")]
    pub format: String,

    #[serde(default)]
    pub pretty: bool,

    #[serde(default)]
    pub ascii: bool,
}

fn default_report_format() -> String {
    "text".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_report_format(),
            pretty: false,
            ascii: false,
        }
    }
}
