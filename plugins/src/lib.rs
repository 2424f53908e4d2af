pub mod executor;
pub mod factory;
pub mod sandbox;
pub mod services;
