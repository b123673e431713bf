//! # Domain Layer
//!
//! Pure verification logic: digests, signer recovery, log decoding and
//! call-status rules. No I/O.

pub mod abi;
pub mod ecdsa;
pub mod eip712;
pub mod entities;
pub mod errors;
pub mod video;
