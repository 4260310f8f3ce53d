// Device HTTP API
//
// `client` holds the transport; the endpoint groups add inherent methods
// to `DeviceClient`.

mod client;
mod commands;
mod firmware;
mod info;

pub use client::DeviceClient;
pub use commands::CommandWrapper;
pub use firmware::format_notes;
