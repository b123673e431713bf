//! # Notify Engine Test Suite
//!
//! Cross-subsystem scenarios that need more than one crate wired together.
//! Per-crate unit tests live next to the code they cover.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs    # Real np-02..np-06 wiring over an in-memory directory
//!     ├── flows.rs      # Ingest -> verify -> resolve -> feed, end to end
//!     ├── settings.rs   # Notification-setting filters through the full pipeline
//!     └── retries.rs    # Attempt cap, abandonment and sweep idempotence
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p np-tests
//! cargo test -p np-tests integration::flows::
//! ```

#![allow(dead_code)]

pub mod integration;
