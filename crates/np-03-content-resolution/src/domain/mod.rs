//! # Domain Layer
//!
//! Pointer grammars and the shared payload formatter. No I/O.

pub mod entities;
pub mod errors;
pub mod formatter;
