#[allow(clippy::module_inception)]
pub mod error;
pub mod registry;
pub mod report;

pub use error::CliError;
pub use registry::RegistryError;
pub use report::{AggregateError, RenderError};
