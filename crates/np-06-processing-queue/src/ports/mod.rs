//! # Ports Layer
//!
//! - `inbound`: the queue API offered to the ingestion endpoint and scheduler
//! - `outbound`: payload/feed stores and delivery transports

pub mod inbound;
pub mod outbound;
