//! # Field Rules
//!
//! Length caps are in characters, not bytes.

pub const TITLE_MAX: usize = 50;
pub const BODY_MAX: usize = 180;
pub const APP_MAX: usize = 40;
pub const ASUB_MAX: usize = 80;
pub const AMSG_MAX: usize = 500;
pub const ACTA_MAX: usize = 255;
pub const AIMG_MAX: usize = 255;

/// Seconds a chat-triggered notification stays alive.
pub const CHAT_EXPIRY_SECS: u64 = 10;

pub fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Drop control characters, then truncate.
pub fn clean(value: &str, max: usize) -> String {
    value.chars().filter(|c| !c.is_control()).take(max).collect()
}
