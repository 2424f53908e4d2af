pub mod sandbox;
pub mod strategy;

pub use sandbox::*;
pub use strategy::*;
