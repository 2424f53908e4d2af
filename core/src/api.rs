//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `snipbox_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, ExecutorConfig, LoggingConfig, RegistryConfig,
    ReportConfig, SandboxConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::error::{AggregateError, CliError, RegistryError, RenderError};
pub use crate::executor::{
    run_snippets, CancelToken, Capabilities, CapabilityTemplate, Clock, ConcurrencyContext,
    ConcurrencyStrategyPlugin, ErrorKind, ExecutionResult, ExecutionStatus, Executor,
    ExecutorOpts, RunOpts, SandboxPlugin, SnippetFailure,
};
pub use crate::registry::{
    load as load_registry, LoaderOptions, Selection, SnippetEntry, SnippetFilter,
    SnippetRegistry,
};
pub use crate::report::{
    RenderStyle, Report, ReportEntry, ReportFormat, ReportRenderer, ResultAggregator, Summary,
};
