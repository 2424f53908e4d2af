//! Isolated execution of snippets.
//!
//! ```text
//! SnippetEntry + CapabilityTemplate::instantiate()
//!   ↓
//! Executor::execute_with_cancel() ─ spawn ─▶ SandboxPlugin::execute()
//!   ↓                     (timeout / cancel → abort, stop waiting)
//! ExecutionResult
//! ```
//!
//! [`run_snippets`] drives the executor over a whole selection.

pub mod capabilities;
mod cancel;
mod classify;
mod engine;
mod progress;
mod scheduler;
pub mod traits;
pub mod types;

pub use cancel::CancelToken;
pub use capabilities::{Capabilities, CapabilityTemplate, Clock, Console, StorageStub};
pub use classify::{classify, failure_from_stderr, parse_error_line};
pub use engine::Executor;
pub use progress::ProgressMonitor;
pub use scheduler::run_snippets;
pub use traits::{ConcurrencyContext, ConcurrencyStrategyPlugin, SandboxPlugin};
pub use types::{
    CapturedOutput, ErrorKind, ExecutionResult, ExecutionStatus, ExecutorOpts, RunOpts,
    SnippetFailure,
};
