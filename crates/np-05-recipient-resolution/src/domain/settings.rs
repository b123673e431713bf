//! # Notification Settings
//!
//! Channels publish an ordered list of setting descriptors; subscribers may
//! store their own list of the same shape. A notification names the setting
//! it is subject to with a dash-delimited index (`"<index>-<type>[-<value>]"`,
//! index 1-based).
//!
//! ## Eligibility
//!
//! 1. No channel settings or no index: everyone is eligible.
//! 2. Subscriber without an override: the channel descriptor at `index` must
//!    have the requested type and be on (`enabled`, else `default`).
//! 3. Subscriber with an override: the channel descriptor *and* the
//!    subscriber's descriptor at `index` must both have the requested type,
//!    and the subscriber's descriptor must be on (`enabled`, else `user`).
//!
//! The dual type check in (3) keeps a stale override from matching after
//! the channel re-publishes a different settings layout.

use serde_json::Value;
use shared_types::json::is_truthy;
use shared_types::Subscriber;
use tracing::warn;

/// Setting type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Boolean = 1,
    Range = 2,
    EnumRange = 3,
}

impl SettingKind {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(SettingKind::Boolean),
            2 => Some(SettingKind::Range),
            3 => Some(SettingKind::EnumRange),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }
}

/// One entry of a channel's or a subscriber's settings list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingDescriptor {
    pub kind: Option<SettingKind>,
    /// Channel-side default.
    pub default: Option<Value>,
    pub enabled: Option<Value>,
    /// Subscriber-side choice.
    pub user: Option<Value>,
    pub lower_limit: Option<Value>,
    pub upper_limit: Option<Value>,
    pub description: Option<String>,
}

impl SettingDescriptor {
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).filter(|v| !v.is_null()).cloned();
        let kind = match value.get("type") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .and_then(SettingKind::from_code);

        Self {
            kind,
            default: field("default"),
            enabled: field("enabled"),
            user: field("user"),
            lower_limit: field("lowerLimit"),
            upper_limit: field("upperLimit"),
            description: value
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn has_kind(&self, code: u64) -> bool {
        self.kind.is_some_and(|kind| kind.code() == code)
    }

    /// Channel default: `enabled` when present, else `default`.
    pub fn channel_default_on(&self) -> bool {
        match &self.enabled {
            Some(enabled) => is_truthy(enabled),
            None => self.default.as_ref().is_some_and(is_truthy),
        }
    }

    /// Subscriber choice: `enabled` when present, else `user`.
    pub fn user_choice_on(&self) -> bool {
        match &self.enabled {
            Some(enabled) => is_truthy(enabled),
            None => self.user.as_ref().is_some_and(is_truthy),
        }
    }
}

/// Parse a JSON-encoded settings list.
pub fn parse_settings(raw: &str) -> Option<Vec<SettingDescriptor>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => Some(entries.iter().map(SettingDescriptor::from_value).collect()),
        Ok(_) | Err(_) => None,
    }
}

/// `"<index>-<type>[-<value>]"` carried at `data.index` of a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSettingIndex {
    /// 1-based position in the settings list.
    pub index: usize,
    pub kind: u64,
    /// Requested value of a range setting. Not range-checked.
    pub value: Option<f64>,
}

impl NotificationSettingIndex {
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split('-').collect();
        let (index, kind, value) = match parts.as_slice() {
            [index, kind] => (index, kind, None),
            [index, kind, value] => (index, kind, Some(value.parse::<f64>().ok()?)),
            _ => return None,
        };
        let index = index.parse::<usize>().ok().filter(|i| *i > 0)?;
        let kind = kind.parse::<u64>().ok()?;
        Some(Self { index, kind, value })
    }

    /// Parse, treating malformed input as absent.
    pub fn parse_lenient(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        let parsed = Self::parse(raw);
        if parsed.is_none() {
            warn!(index = raw, "[np-05] Ignoring malformed notification setting index");
        }
        parsed
    }

    fn position(&self) -> usize {
        self.index - 1
    }
}

/// Filters subscribers by notification settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsMatcher;

impl SettingsMatcher {
    /// Addresses of the subscribers eligible for a notification.
    pub fn matching(
        &self,
        channel_settings: Option<&str>,
        subscribers: &[Subscriber],
        index: Option<&NotificationSettingIndex>,
    ) -> Vec<String> {
        let everyone = || subscribers.iter().map(|s| s.subscriber.clone()).collect();
        let (Some(raw), Some(index)) = (channel_settings, index) else {
            return everyone();
        };
        let Some(channel) = parse_settings(raw) else {
            warn!("[np-05] Channel settings are not a JSON array, skipping filter");
            return everyone();
        };

        subscribers
            .iter()
            .filter(|subscriber| {
                let user = subscriber.user_settings.as_deref().and_then(|raw| {
                    let parsed = parse_settings(raw);
                    if parsed.is_none() {
                        warn!(
                            subscriber = %subscriber.subscriber,
                            "[np-05] Unreadable user settings, using channel default"
                        );
                    }
                    parsed
                });
                is_eligible(&channel, user.as_deref(), index)
            })
            .map(|subscriber| subscriber.subscriber.clone())
            .collect()
    }
}

/// Eligibility of one subscriber against the channel's settings.
pub fn is_eligible(
    channel: &[SettingDescriptor],
    user: Option<&[SettingDescriptor]>,
    index: &NotificationSettingIndex,
) -> bool {
    let Some(channel_setting) = channel.get(index.position()) else {
        return false;
    };
    if !channel_setting.has_kind(index.kind) {
        return false;
    }
    match user {
        None => channel_setting.channel_default_on(),
        Some(user) => user
            .get(index.position())
            .is_some_and(|own| own.has_kind(index.kind) && own.user_choice_on()),
    }
}
