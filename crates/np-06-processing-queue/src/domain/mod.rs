//! # Domain Layer
//!
//! Payload rows, queue configuration and errors.

pub mod entities;
pub mod errors;
