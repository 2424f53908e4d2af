//! Sandboxes that actually run snippet source.

mod io_pump;
pub mod process;

pub use process::{ProcessSandbox, STDERR_TAIL_LINES};
