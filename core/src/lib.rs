//! snipbox core: snippet catalog, isolated execution and run reports.
//!
//! ```text
//! SnippetRegistry ──select()──▶ Vec<SnippetEntry>
//!   ↓
//! run_snippets(Executor, ..) ──▶ Executor::execute() per entry (SandboxPlugin)
//!   ↓
//! ResultAggregator::record_at() ──finalize()──▶ Report
//!   ↓
//! ReportRenderer::render() ──▶ String
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod registry;
pub mod report;
pub mod util;
