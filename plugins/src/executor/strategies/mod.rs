pub mod concurrency;

pub use concurrency::{CpuConcurrencyPlugin, FixedConcurrencyPlugin};
