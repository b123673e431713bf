//! # Content Resolution Subsystem (NP-03)
//!
//! Turns a `(storageType, storagePointer)` pair into the canonical
//! notification JSON, querying one of five backends.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pointer grammars, payload formatter
//! - **Ports Layer** (`ports/`): `ContentApi` in, `ContentStore` out
//! - **Service Layer** (`service.rs`): `ContentResolver`
//!
//! Backend failures surface as `ContentError`; they are never fatal to a
//! sweep, the item is simply retried.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{ChatPointer, ChatPointerKind, ContentConfig, SubgraphPointer};
pub use domain::errors::ContentError;
pub use domain::formatter::{format_subgraph_notification, normalize_recipients};
pub use ports::inbound::ContentApi;
pub use ports::outbound::{ContentStore, ContentStoreError};
pub use service::ContentResolver;
