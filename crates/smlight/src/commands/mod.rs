//! Command dispatch: bridges CLI args -> device client calls -> output formatting.

pub mod auth;
pub mod cmd;
pub mod firmware;
pub mod info;
pub mod toggle;
pub mod watch;

use std::sync::Arc;

use smlight_api::{DeviceClient, SseClient};
use smlight_config::DeviceSettings;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Build a device client that shares one HTTP client with its event stream.
pub async fn connect(settings: &DeviceSettings) -> Result<DeviceClient, CliError> {
    let client = DeviceClient::new(&settings.host, &settings.transport)?;
    let sse = SseClient::new(
        client.http().clone(),
        SseClient::events_url(&settings.host)?,
        settings.sse.clone(),
    );
    sse.set_legacy_api(settings.legacy_api);
    let client = client.with_sse(Arc::new(sse));

    if let Some(ref creds) = settings.credentials {
        client
            .authenticate(&creds.username, creds.password.clone())
            .await?;
    }

    Ok(client)
}

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &DeviceClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Info => info::handle_info(client, global).await,
        Command::Sensors => info::handle_sensors(client, global).await,
        Command::Watch(args) => watch::handle(client, args, global).await,
        Command::Cmd(args) => cmd::handle(client, args, global).await,
        Command::Toggle(args) => toggle::handle(client, args, global).await,
        Command::Firmware(args) => firmware::handle(client, args, global).await,
        Command::AuthCheck => auth::handle(client, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
