//! # Ports Layer
//!
//! - `inbound`: the API this subsystem offers
//! - `outbound`: collaborators it depends on

pub mod inbound;
pub mod outbound;
