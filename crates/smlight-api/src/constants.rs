// Device protocol constants
//
// Numeric identifiers the SLZB-06x firmware uses on its `/api2` endpoint,
// settings page ids, and the lookup tables the firmware metadata service
// is keyed by.

use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

/// SMLIGHT OTA metadata service.
pub const FW_URL: &str = "https://updates.smlight.tech/services/api/slzb-06x-ota.php";

/// Parameters `get_param` is allowed to query.
pub const PARAM_LIST: &[&str] = &[
    "coordMode",
    "zbRev",
    "espRev",
    "inetState",
    "locale",
    "newIpAvaiable",
];

/// Response header carrying page values on `API_GET_PAGE` requests.
pub const RESP_VALUES_HEADER: &str = "respValuesArr";

// ── Actions ──────────────────────────────────────────────────────────

/// `action=` values accepted by `/api2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u8)]
pub enum Action {
    GetPage = 0,
    GetParam = 1,
    StartWifiScan = 2,
    SendHex = 3,
    Cmd = 4,
    GetLog = 5,
    FlashZb = 6,
    WifiConnectStat = 7,
    FlashEsp = 8,
    Zhub = 9,
}

impl Action {
    #[allow(clippy::as_conversions)]
    pub fn id(self) -> u8 {
        self as u8
    }
}

// ── Commands ─────────────────────────────────────────────────────────

/// `cmd=` values used with [`Action::Cmd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u8)]
pub enum Command {
    ZbRouterRecon = 0,
    ZbRestart = 1,
    ZbBootloader = 2,
    EspRestart = 3,
    ClearLog = 4,
    ZbEnergyScan = 5,
    ZbLedNetwork = 6,
    ZbLedPermit = 7,
    ZbLedDisabled = 8,
    HardReset = 9,
    TempCalib = 10,
    ZbIeeeWrite = 11,
    ZbIeeeReadFactory = 12,
    WhtnwMarkRead = 13,
}

impl Command {
    #[allow(clippy::as_conversions)]
    pub fn id(self) -> u8 {
        self as u8
    }
}

// ── Settings pages ───────────────────────────────────────────────────

/// Settings page identifiers.
///
/// Firmware newer than this client may report pages not listed here;
/// [`Page::from_id`] returns `None` for those.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromRepr, EnumIter, Display,
)]
#[repr(u8)]
pub enum Page {
    Dashboard = 0,
    Mode = 1,
    Network = 2,
    ZhaZ2m = 3,
    Security = 4,
    Vpn = 5,
    SettingsGeneral = 6,
    SettingsOta = 7,
    SettingsLed = 8,
    SettingsTime = 9,
    SettingsSystemLog = 10,
    About = 11,
    Feedback = 12,
    ZhubDevices = 13,
    ZhubDashboard = 14,
}

impl Page {
    /// Numeric page id as sent on the wire.
    #[allow(clippy::as_conversions)]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Resolve a wire page id. Out-of-range and negative ids yield `None`.
    pub fn from_id(id: i64) -> Option<Self> {
        u8::try_from(id).ok().and_then(Self::from_repr)
    }
}

// ── Device models ────────────────────────────────────────────────────

/// Device model names and the index the OTA service keys Zigbee
/// firmware lists by.
pub const DEVICES: &[(&str, u8)] = &[
    ("SLZB-06", 0),
    ("SLZB-06M", 1),
    ("SLZB-06Mg24", 2),
    ("SLZB-06p7", 3),
    ("SLZB-06p10", 4),
];

/// OTA index for a device model, if known.
pub fn device_index(model: &str) -> Option<u8> {
    DEVICES
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, idx)| *idx)
}

/// Zigbee radio role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ZbType {
    Unknown,
    Coordinator,
    Router,
    Thread,
}

impl ZbType {
    pub fn from_id(id: i64) -> Self {
        match id {
            0 => Self::Coordinator,
            1 => Self::Router,
            2 => Self::Thread,
            _ => Self::Unknown,
        }
    }
}

/// Zigbee firmware channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ZbChannel {
    Unknown,
    Stable,
    Dev,
    Custom,
}

impl ZbChannel {
    pub fn from_id(id: i64) -> Self {
        match id {
            0 => Self::Stable,
            1 => Self::Dev,
            2 => Self::Custom,
            _ => Self::Unknown,
        }
    }
}

/// Ethernet/Wi-Fi coordinator mode.
pub fn coord_mode_name(mode: i64) -> Option<&'static str> {
    match mode {
        0 => Some("eth"),
        1 => Some("wifi"),
        2 => Some("usb"),
        3 => Some("ppp"),
        _ => None,
    }
}

// ── Wi-Fi / reset status ─────────────────────────────────────────────

/// ESP32 Wi-Fi station status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum WifiStatus {
    IdleStatus = 0,
    NoSsidAvail = 1,
    ScanCompleted = 2,
    Connected = 3,
    ConnectFailed = 4,
    ConnectionLost = 5,
    Disconnected = 6,
    NoShield = 255,
}

/// ESP32 reset reasons reported after a reboot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum RebootReason {
    Unknown = 0,
    PowerOn = 1,
    External = 2,
    Software = 3,
    Panic = 4,
    InterruptWatchdog = 5,
    TaskWatchdog = 6,
    Watchdog = 7,
    DeepSleep = 8,
    Brownout = 9,
    Sdio = 10,
}
