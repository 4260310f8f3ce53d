// Device data models
//
// Shapes returned by `/ha_info`, `/ha_sensors`, and the OTA metadata
// service. Fields are optional where firmware revisions disagree.

use serde::{Deserialize, Deserializer, Serialize};

/// Static device information from `GET /ha_info` (the `Info` object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub coord_mode: Option<i64>,
    pub device_ip: Option<String>,
    /// Core firmware channel: `"dev"` or `"stable"`.
    pub fw_channel: Option<String>,
    #[serde(rename = "MAC")]
    pub mac: Option<String>,
    #[serde(deserialize_with = "normalize_model")]
    pub model: Option<String>,
    pub ram_total: Option<i64>,
    pub fs_total: Option<i64>,
    pub sw_version: Option<String>,
    pub wifi_mode: Option<i64>,
    pub zb_flash_size: Option<i64>,
    pub zb_hw: Option<String>,
    pub zb_ram_size: Option<i64>,
    #[serde(deserialize_with = "string_or_number")]
    pub zb_version: Option<String>,
    pub zb_type: Option<i64>,
    /// Number of Zigbee radios (multi-radio devices such as SLZB-MR1).
    pub radios: Option<Vec<Radio>>,
}

/// One Zigbee radio on a multi-radio device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Radio {
    pub chip_index: Option<i64>,
    pub zb_hw: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub zb_version: Option<String>,
    pub zb_type: Option<i64>,
    pub zb_channel: Option<i64>,
    pub radio_mode: Option<i64>,
}

/// Live sensor values and toggle states from `GET /ha_sensors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensors {
    pub esp32_temp: f64,
    pub zb_temp: f64,
    pub uptime: Option<i64>,
    pub socket_uptime: Option<i64>,
    pub ram_usage: Option<i64>,
    pub fs_used: Option<i64>,
    pub ethernet: bool,
    pub wifi_connected: bool,
    pub wifi_status: Option<i64>,
    pub disable_leds: Option<bool>,
    pub night_mode: Option<bool>,
    pub auto_zigbee: Option<bool>,
    pub vpn_enabled: Option<bool>,
}

/// Which processor a firmware image targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirmwareMode {
    #[serde(rename = "ESP")]
    Esp,
    #[serde(rename = "ZB")]
    Zigbee,
}

impl FirmwareMode {
    /// `type=` value the OTA service expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esp => "ESP",
            Self::Zigbee => "ZB",
        }
    }
}

/// One entry from the OTA metadata service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Firmware {
    /// Set by the client after fetching; not part of the OTA payload.
    #[serde(skip_deserializing)]
    pub mode: Option<FirmwareMode>,
    #[serde(rename = "type")]
    pub fw_type: Option<i64>,
    pub notes: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub rev: Option<String>,
    pub link: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub ver: Option<String>,
    pub dev: bool,
    pub baud: Option<u32>,
    pub prod: bool,
}

// ── Deserialization helpers ──────────────────────────────────────────

fn normalize_model<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let model: Option<String> = Option::deserialize(deserializer)?;
    Ok(model.map(|m| m.replace('P', "p")))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
