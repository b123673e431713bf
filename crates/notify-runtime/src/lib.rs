//! # Notify Runtime Library
//!
//! Exposes the runtime's wiring for tests and embedding. The entry point is
//! the `main.rs` binary.
//!
//! - `container/` - configuration and dependency wiring
//! - `adapters/` - HTTP and in-process implementations of outbound ports
//! - `scheduler` - periodic retry sweep
//! - `server` - `/metrics` and `/health`

pub mod adapters;
pub mod container;
pub mod scheduler;
pub mod server;

pub use container::{ConfigError, EngineConfig, EngineContainer};
pub use scheduler::SweepScheduler;
