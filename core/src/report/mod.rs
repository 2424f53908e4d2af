//! Run reports: aggregation of per-snippet results and the renderer seam.

mod aggregator;
mod render;
mod types;

pub use aggregator::ResultAggregator;
pub use render::{RenderStyle, ReportFormat, ReportRenderer};
pub use types::{Report, ReportEntry, Summary};
