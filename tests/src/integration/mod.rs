//! End-to-end scenarios across np-01..np-06.

pub mod flows;
pub mod harness;
pub mod retries;
pub mod settings;
