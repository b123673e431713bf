//! # Domain Layer
//!
//! Pure string/byte decoding with no I/O.

pub mod errors;
pub mod identity;
pub mod proof;
