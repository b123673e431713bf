//! # Domain Layer
//!
//! Settings matching and recipient set types. No I/O.

pub mod entities;
pub mod errors;
pub mod settings;
