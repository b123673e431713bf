//! # Shared Types Crate
//!
//! Domain entities and collaborator ports shared by the notification
//! subsystems (np-01 .. np-06).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: CAIP addresses, sender/payload kinds and the
//!   channel/subscriber/chat records are defined once, here.
//! - **Read-only directories**: `ChannelDirectory` and `ChatDirectory` are the
//!   only views the engine has of the relational and chat stores. Nothing in
//!   the engine writes through them.
//! - **Explicit injection**: every service receives its directories as
//!   constructor arguments; there is no global lookup.

pub mod entities;
pub mod errors;
pub mod json;
pub mod memory;
pub mod ports;

pub use entities::*;
pub use errors::*;
pub use memory::InMemoryDirectory;
pub use ports::*;
