//! # Engine Container
//!
//! Holds every subsystem instance and wires them to their adapters.

pub mod config;
pub mod engine;

pub use config::{ConfigError, EngineConfig};
pub use engine::EngineContainer;
