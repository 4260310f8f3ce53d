// smlight-api: Async Rust client for SMLIGHT SLZB-06x coordinators (HTTP API + SSE)

pub mod auth;
pub mod constants;
pub mod device;
pub mod error;
pub mod models;
pub mod sse;
pub mod transport;

pub use auth::Credentials;
pub use constants::{Action, Command, Page};
pub use device::{CommandWrapper, DeviceClient};
pub use error::Error;
pub use models::{Firmware, FirmwareMode, Info, Radio, Sensors};
pub use sse::{
    Disposer, EventKind, MessageEvent, Setting, SettingValue, SettingsEvent, SseClient, SseConfig,
};
pub use transport::TransportConfig;
