//! Settings key registry and the `SAVE_PARAMS` decoder.
//!
//! The device reports settings changes per page: one `SAVE_PARAMS` event
//! names a page and a map of changed wire keys. Consumers subscribe per
//! logical [`Setting`] instead, so each changed key is routed and
//! delivered as its own [`SettingsEvent`].

use std::collections::BTreeMap;

use serde::Deserialize;
use strum::{Display, EnumIter};
use tracing::{debug, trace};

use super::event::MessageEvent;
use super::registry::CallbackRegistry;
use crate::constants::Page;

/// Toggles and config keys that can be watched individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Setting {
    DisableLeds,
    NightMode,
    ZbAutoupdate,
    EnableVpn,
}

impl Setting {
    /// The settings page and wire key this setting lives under.
    pub fn wire_key(self) -> (Page, &'static str) {
        match self {
            Self::DisableLeds => (Page::SettingsLed, "disableLeds"),
            Self::NightMode => (Page::SettingsLed, "nightMode"),
            Self::ZbAutoupdate => (Page::SettingsOta, "enabled"),
            Self::EnableVpn => (Page::Vpn, "enabled"),
        }
    }

    /// Field name of this setting's state in [`Sensors`](crate::Sensors).
    pub fn sensor_field(self) -> &'static str {
        match self {
            Self::DisableLeds => "disable_leds",
            Self::NightMode => "night_mode",
            Self::ZbAutoupdate => "auto_zigbee",
            Self::EnableVpn => "vpn_enabled",
        }
    }

    pub fn matches(self, page: Page, key: &str) -> bool {
        let (own_page, own_key) = self.wire_key();
        own_page == page && own_key == key
    }
}

/// New value of a changed setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

impl SettingValue {
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Bool(_) => None,
        }
    }
}

/// One changed setting, as delivered to a settings callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsEvent {
    pub page: Page,
    /// Who made the change, e.g. `"ha"` or the device web UI.
    pub origin: String,
    pub need_reboot: bool,
    /// Exactly one `wire key → new value` entry.
    pub setting: BTreeMap<String, SettingValue>,
}

impl SettingsEvent {
    /// The changed wire key and its new value.
    pub fn change(&self) -> Option<(&str, SettingValue)> {
        self.setting
            .iter()
            .next()
            .map(|(key, value)| (key.as_str(), *value))
    }
}

// ── Decoder ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveParamsPayload {
    page: i64,
    #[serde(default)]
    origin: String,
    #[serde(default)]
    need_reboot: bool,
    changes: serde_json::Map<String, serde_json::Value>,
}

/// Fan a `SAVE_PARAMS` event out to the registered settings callbacks.
///
/// Returns the number of callbacks invoked. Malformed payloads and pages
/// this client does not know are dropped without error.
pub(crate) fn dispatch_settings(event: &MessageEvent, registry: &CallbackRegistry) -> usize {
    let payload: SaveParamsPayload = match event.json() {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "dropping malformed SAVE_PARAMS payload");
            return 0;
        }
    };

    let Some(page) = Page::from_id(payload.page) else {
        debug!(page = payload.page, "dropping SAVE_PARAMS for unknown page");
        return 0;
    };

    let mut invoked = 0;
    for (key, raw) in &payload.changes {
        let Some((setting, callback)) = registry.settings_callback_for(page, key) else {
            trace!(page = %page, key = %key, "no settings callback registered");
            continue;
        };
        let Some(value) = SettingValue::from_json(raw) else {
            debug!(key = %key, value = %raw, "ignoring non-scalar setting value");
            continue;
        };

        let change = SettingsEvent {
            page,
            origin: payload.origin.clone(),
            need_reboot: payload.need_reboot,
            setting: BTreeMap::from([(key.clone(), value)]),
        };
        trace!(setting = %setting, origin = %change.origin, "delivering settings change");
        callback(&change);
        invoked += 1;
    }
    invoked
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use strum::IntoEnumIterator;

    use super::*;
    use crate::sse::registry::SettingsCallback;

    fn recorder() -> (Arc<Mutex<Vec<SettingsEvent>>>, SettingsCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&seen);
        let cb: SettingsCallback = Arc::new(move |event: &SettingsEvent| {
            inner.lock().unwrap().push(event.clone());
        });
        (seen, cb)
    }

    fn save_params(data: &str) -> MessageEvent {
        MessageEvent::new("SAVE_PARAMS", data)
    }

    #[test]
    fn wire_keys_are_unique() {
        let keys: Vec<_> = Setting::iter().map(Setting::wire_key).collect();
        for (i, key) in keys.iter().enumerate() {
            assert!(!keys[i + 1..].contains(key), "duplicate wire key {key:?}");
        }
    }

    #[test]
    fn fans_out_only_registered_keys() {
        let registry = Arc::new(CallbackRegistry::default());
        let (seen, cb) = recorder();
        registry.register_setting(Setting::DisableLeds, cb);

        let invoked = dispatch_settings(
            &save_params(
                r#"{"page":8,"origin":"ha","changes":{"disableLeds":true,"nightMode":false},"needReboot":false}"#,
            ),
            &registry,
        );

        assert_eq!(invoked, 1);
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[SettingsEvent {
                page: Page::SettingsLed,
                origin: "ha".into(),
                need_reboot: false,
                setting: BTreeMap::from([("disableLeds".into(), SettingValue::Bool(true))]),
            }]
        );
    }

    #[test]
    fn one_invocation_per_changed_key() {
        let registry = Arc::new(CallbackRegistry::default());
        let (leds, cb1) = recorder();
        let (night, cb2) = recorder();
        registry.register_setting(Setting::DisableLeds, cb1);
        registry.register_setting(Setting::NightMode, cb2);

        let invoked = dispatch_settings(
            &save_params(
                r#"{"page":8,"origin":"web","changes":{"disableLeds":false,"nightMode":1},"needReboot":true}"#,
            ),
            &registry,
        );

        assert_eq!(invoked, 2);
        let night = night.lock().unwrap();
        assert_eq!(night.len(), 1);
        assert_eq!(night[0].change(), Some(("nightMode", SettingValue::Int(1))));
        assert!(night[0].need_reboot);
        assert_eq!(leds.lock().unwrap()[0].setting.len(), 1);
    }

    #[test]
    fn same_key_on_other_page_does_not_match() {
        let registry = Arc::new(CallbackRegistry::default());
        let (ota, cb1) = recorder();
        let (vpn, cb2) = recorder();
        registry.register_setting(Setting::ZbAutoupdate, cb1);
        registry.register_setting(Setting::EnableVpn, cb2);

        dispatch_settings(
            &save_params(r#"{"page":5,"origin":"ha","changes":{"enabled":true}}"#),
            &registry,
        );

        assert!(ota.lock().unwrap().is_empty());
        assert_eq!(vpn.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_page_is_dropped() {
        let registry = Arc::new(CallbackRegistry::default());
        let (seen, cb) = recorder();
        registry.register_setting(Setting::DisableLeds, cb);

        let invoked = dispatch_settings(
            &save_params(r#"{"page":999,"origin":"ha","changes":{"disableLeds":true}}"#),
            &registry,
        );

        assert_eq!(invoked, 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn malformed_payloads_are_dropped() {
        let registry = Arc::new(CallbackRegistry::default());
        let (seen, cb) = recorder();
        registry.register_setting(Setting::DisableLeds, cb);

        for data in [
            "not json",
            r#"{"page":"eight","changes":{"disableLeds":true}}"#,
            r#"{"page":8,"origin":"ha"}"#,
            r#"{"page":8,"changes":{"disableLeds":"yes"}}"#,
        ] {
            assert_eq!(dispatch_settings(&save_params(data), &registry), 0);
        }
        assert!(seen.lock().unwrap().is_empty());
    }
}
