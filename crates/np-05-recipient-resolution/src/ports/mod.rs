//! # Ports Layer
//!
//! Only the inbound API lives here; lookups go through the shared
//! `ChannelDirectory` and `ChatDirectory` ports.

pub mod inbound;
