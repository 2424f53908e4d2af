pub mod renderers;
pub mod strategies;

pub use renderers::{JsonRendererPlugin, TextRendererPlugin};
pub use strategies::{CpuConcurrencyPlugin, FixedConcurrencyPlugin};
