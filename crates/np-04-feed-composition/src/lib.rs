//! # Feed Composition Subsystem (NP-04)
//!
//! Builds the canonical `FeedPayload` from channel metadata, the resolved
//! payload JSON and the verification proof, and wraps it with a delivery
//! header into a `FeedItem`.
//!
//! ## Business Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | title | `"<name> - <title>"`, or the secret notice; controls stripped, 50 chars |
//! | body | controls stripped, 180 chars |
//! | app / asub / amsg / acta / aimg | 40 / 80 / 500 / 255 / 255 chars |
//! | etime, hidden | forced to `now + 10`, `true` for chat proofs |
//! | additionalMeta | untyped objects are stringified |

pub mod domain;
pub mod service;

pub use domain::entities::{
    ChannelMeta, FeedData, FeedHeader, FeedItem, FeedNotification, FeedPayload, Recipients,
    ResolvedRecipient,
};
pub use domain::errors::FeedError;
pub use service::FeedComposer;
