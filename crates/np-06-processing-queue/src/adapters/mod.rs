//! # Adapters
//!
//! In-memory implementations of the store ports.

pub mod memory;

pub use memory::{InMemoryFeedStore, InMemoryPayloadStore};
