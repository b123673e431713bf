//! # Payload Codec Subsystem (NP-01)
//!
//! Parses and serializes the two delimiter-encoded strings every payload
//! carries:
//!
//! - **Payload identity**: `"<storageType>+<storagePointer…>"`
//! - **Verification proof**: `"<scheme>:<field1>:<field2>…"`
//!
//! Both grammars are an external wire format and are preserved byte-for-byte;
//! only the parsers are typed.
//!
//! ## Module Structure
//!
//! ```text
//! np-01-payload-codec/
//! └── domain/
//!     ├── identity.rs   # StorageType, PayloadIdentity
//!     ├── proof.rs      # VerificationProof, PgpTag
//!     └── errors.rs     # CodecError
//! ```

pub mod domain;

pub use domain::errors::CodecError;
pub use domain::identity::{PayloadIdentity, StorageType};
pub use domain::proof::{PgpTag, VerificationProof};
