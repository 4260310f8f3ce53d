//! Event taxonomy and the raw wire event record.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Kinds of events the device emits on its `/events` stream.
///
/// Every concrete variant corresponds to one wire `event:` name.
/// [`EventKind::CatchAll`] is reserved for callbacks that want every
/// event, and is never produced by [`EventKind::from_wire`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum EventKind {
    /// Wi-Fi scan results (JSON `{"wifi": [...]}`).
    #[strum(serialize = "API2_WIFISCANSTATUS")]
    WifiScanStatus,
    /// ESP32 firmware update finished.
    #[strum(serialize = "ESP_UPD_done")]
    EspUpdateDone,
    /// Internet reachability changed.
    #[strum(serialize = "EVENT_INET_STATE")]
    InetState,
    /// Core firmware update finished.
    #[strum(serialize = "FW_UPD_done")]
    FwUpdateDone,
    /// One device log line.
    #[strum(serialize = "LOG_STR")]
    LogStr,
    /// A settings page was saved; payload lists the changed keys.
    #[strum(serialize = "SAVE_PARAMS")]
    SaveParams,
    /// Zigbee flashing failed.
    #[strum(serialize = "ZB_FW_err")]
    ZbFwError,
    /// Zigbee flashing status text.
    #[strum(serialize = "ZB_FW_info")]
    ZbFwInfo,
    /// Zigbee flashing progress.
    #[strum(serialize = "ZB_FW_prgs")]
    ZbFwProgress,
    #[strum(serialize = "ZB_ENERGY_SCAN_DONE")]
    ZbEnergyScanDone,
    #[strum(serialize = "WHTNW")]
    Whtnw,
    #[strum(serialize = "REBOOT")]
    Reboot,
    /// Matches every event, recognized or not.
    #[strum(serialize = "CATCH_ALL")]
    CatchAll,
}

impl EventKind {
    /// Map a wire event name to a concrete kind.
    ///
    /// Returns `None` for names this client does not know about (newer
    /// firmware) and for the reserved catch-all name.
    pub fn from_wire(name: &str) -> Option<Self> {
        name.parse::<Self>().ok().filter(|kind| *kind != Self::CatchAll)
    }

    /// The wire name of this kind.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One event as received from the stream, before any interpretation.
///
/// `data` is either a plain string (log lines, `"ok"`) or JSON, depending
/// on the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// The `event:` field. Defaults to `"message"` when the server omits it.
    pub event_type: String,
    /// The `data:` field; multiple data lines are joined with `\n`.
    pub data: String,
    /// The `id:` field if present. Never used for resumption.
    pub id: Option<String>,
}

impl MessageEvent {
    pub fn new(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: data.into(),
            id: None,
        }
    }

    /// The taxonomy entry for this event, if recognized.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_wire(&self.event_type)
    }

    /// Parse the data field as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}
