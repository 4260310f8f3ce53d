// Server-Sent Events client for the device's `/events` stream
//
// `parse` turns bytes into `MessageEvent`s, `dispatch` routes them to the
// callbacks held in `registry`, `settings` decodes `SAVE_PARAMS` into
// per-setting changes, and `client` keeps the connection alive.

mod client;
mod dispatch;
pub mod event;
pub mod parse;
mod registry;
pub mod settings;

pub use client::{SseClient, SseConfig};
pub use event::{EventKind, MessageEvent};
pub use parse::EventDecoder;
pub use registry::{Disposer, EventCallback, SettingsCallback};
pub use settings::{Setting, SettingValue, SettingsEvent};
