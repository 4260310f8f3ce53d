// Device command endpoints
//
// `/api2` commands, settings toggles, and Wi-Fi scans.

use tracing::debug;

use crate::constants::{Action, Command, Page};
use crate::device::client::DeviceClient;
use crate::error::Error;
use crate::sse::{Disposer, EventKind, MessageEvent, Setting};

/// Body the device answers successful commands with.
const OK: &str = "ok";

impl DeviceClient {
    /// Send a device command.
    ///
    /// `GET /api2?action=4&cmd=N[&key=value]`
    ///
    /// `extra` adds one `key=value` query pair; it is only sent when the
    /// value is positive. Returns `true` when the device answers `ok`.
    pub async fn set_cmd(&self, cmd: Command, extra: Option<(&str, i64)>) -> Result<bool, Error> {
        let mut params = vec![
            ("action", Action::Cmd.id().to_string()),
            ("cmd", cmd.id().to_string()),
        ];
        if let Some((key, value)) = extra.filter(|(_, value)| *value > 0) {
            params.push((key, value.to_string()));
        }
        debug!(?cmd, "sending command");

        let body = self.get(&params, None).await?;
        Ok(body.as_deref() == Some(OK))
    }

    /// Convenience wrappers for the common commands.
    pub fn commands(&self) -> CommandWrapper<'_> {
        CommandWrapper { client: self }
    }

    /// Switch a settings toggle on or off.
    ///
    /// `POST /settings/saveParams` with `pageId=N&<key>=on|off&ha=true`
    pub async fn set_toggle(&self, page: Page, key: &str, value: bool) -> Result<bool, Error> {
        let state = if value { "on" } else { "off" };
        let params = [
            ("pageId", page.id().to_string()),
            (key, state.to_owned()),
            ("ha", "true".to_owned()),
        ];
        debug!(page = %page, key, state, "setting toggle");
        self.post(&params).await
    }

    /// [`set_toggle`](Self::set_toggle) addressed by [`Setting`].
    pub async fn set_setting(&self, setting: Setting, value: bool) -> Result<bool, Error> {
        let (page, key) = setting.wire_key();
        self.set_toggle(page, key, value).await
    }

    /// Start a Wi-Fi scan.
    ///
    /// `GET /api2?action=2`
    ///
    /// Results arrive later as an `API2_WIFISCANSTATUS` event, delivered to
    /// `callback` by the event client. Dispose the returned handle once the
    /// results are in. If the scan cannot be started the callback is
    /// removed again.
    pub async fn scan_wifi<F>(&self, callback: F) -> Result<Disposer, Error>
    where
        F: Fn(&MessageEvent) + Send + Sync + 'static,
    {
        let disposer = self
            .sse()
            .register_callback(EventKind::WifiScanStatus, callback);
        let params = [("action", Action::StartWifiScan.id().to_string())];
        debug!("starting wifi scan");

        if let Err(e) = self.get(&params, None).await {
            disposer.dispose();
            return Err(e);
        }
        Ok(disposer)
    }
}

/// Shorthand for frequently used [`Command`]s.
///
/// Obtained from [`DeviceClient::commands`].
#[derive(Debug, Clone, Copy)]
pub struct CommandWrapper<'a> {
    client: &'a DeviceClient,
}

impl CommandWrapper<'_> {
    /// Restart the ESP32 core.
    pub async fn reboot(&self) -> Result<bool, Error> {
        self.client.set_cmd(Command::EspRestart, None).await
    }

    /// Put the Zigbee chip into its bootloader.
    pub async fn zb_bootloader(&self) -> Result<bool, Error> {
        self.client.set_cmd(Command::ZbBootloader, None).await
    }

    /// Restart the Zigbee chip.
    pub async fn zb_restart(&self) -> Result<bool, Error> {
        self.client.set_cmd(Command::ZbRestart, None).await
    }

    /// Trigger router reconnect on radio `idx`.
    pub async fn zb_router(&self, idx: u8) -> Result<bool, Error> {
        self.client
            .set_cmd(Command::ZbRouterRecon, Some(("idx", i64::from(idx))))
            .await
    }
}
