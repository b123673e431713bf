//! # Recipient Resolution Subsystem (NP-05)
//!
//! Computes who receives a composed feed, split into subscribed (or
//! chat-approved) and unsubscribed (spam, or chat-unapproved) sets.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `SettingsMatcher`, setting descriptors,
//!   `NotificationSettingIndex`
//! - **Ports Layer** (`ports/`): `RecipientApi`
//! - **Service Layer** (`service.rs`): `RecipientResolver`

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{
    RecipientConfig, RecipientQuery, ResolvedRecipients, DEFAULT_MAX_SUBSET_RECIPIENTS,
};
pub use domain::errors::RecipientError;
pub use domain::settings::{
    is_eligible, parse_settings, NotificationSettingIndex, SettingDescriptor, SettingKind,
    SettingsMatcher,
};
pub use ports::inbound::RecipientApi;
pub use service::RecipientResolver;
