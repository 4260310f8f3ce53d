// Firmware endpoints
//
// Release lookup against the SMLIGHT OTA metadata service and the flash
// commands that hand a release to the device.

use tracing::debug;

use crate::constants::{Action, device_index};
use crate::device::client::DeviceClient;
use crate::error::Error;
use crate::models::{Firmware, FirmwareMode};

/// Multi-radio model whose radios are listed under other models.
const MULTI_RADIO_MODEL: &str = "SLZB-MR1";

/// Last core version that needs the chip count sent explicitly when
/// flashing the second radio.
const LAST_CHIP_NUM_VERSION: &str = "v2.7.2";

impl DeviceClient {
    /// List available firmware releases.
    ///
    /// Queries the OTA metadata service for ESP32 core releases or, with
    /// [`FirmwareMode::Zigbee`], for the Zigbee releases of `device`.
    /// Development builds are only listed when `channel` is `"dev"`.
    /// `zb_type` restricts Zigbee releases to one radio role, and `idx`
    /// selects the radio on multi-radio devices.
    ///
    /// Returns `None` when the service has no list for the device.
    pub async fn get_firmware_version(
        &self,
        channel: Option<&str>,
        device: Option<&str>,
        mode: FirmwareMode,
        zb_type: Option<i64>,
        idx: u8,
    ) -> Result<Option<Vec<Firmware>>, Error> {
        let mut params = vec![("type", mode.as_str().to_owned())];
        if mode == FirmwareMode::Zigbee {
            params.push(("format", "slzb".to_owned()));
        }
        debug!(mode = mode.as_str(), ?device, ?channel, "fetching firmware list");

        let Some(body) = self.get(&params, Some(self.firmware_url())).await? else {
            return Ok(None);
        };
        let mut data: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

        let list_key = match mode {
            FirmwareMode::Esp => "fw".to_owned(),
            FirmwareMode::Zigbee => {
                let device = device.ok_or(Error::UnsupportedOperation(
                    "zigbee firmware lookup needs a device model",
                ))?;
                let model = ota_model(device, idx);
                let Some(index) = device_index(model) else {
                    debug!(model, "no firmware index for device model");
                    return Ok(None);
                };
                index.to_string()
            }
        };

        let entries = match data.get_mut(&list_key).map(serde_json::Value::take) {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => return Ok(None),
        };

        let mut releases = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut item: Firmware = serde_json::from_value(entry)
                .map_err(|e| Error::deserialization(&e, &body))?;
            if item.dev && channel != Some("dev") {
                continue;
            }
            item.mode = Some(mode);
            if item.notes.is_some() {
                item.notes = format_notes(&item);
            }
            if zb_type.is_some() && item.fw_type != zb_type {
                continue;
            }
            releases.push(item);
        }
        Ok(Some(releases))
    }

    /// Ask the device to flash a release.
    ///
    /// Zigbee releases go to radio `idx` via `action=6`; core releases via
    /// `action=8`. Returns `true` when the device answers `ok`.
    pub async fn fw_update(&self, firmware: &Firmware, idx: u8) -> Result<bool, Error> {
        let link = firmware
            .link
            .clone()
            .ok_or(Error::UnsupportedOperation("firmware has no download link"))?;

        let params = if firmware.mode == Some(FirmwareMode::Zigbee) {
            let mut params = vec![("action", Action::FlashZb.id().to_string())];
            if let Some(baud) = firmware.baud {
                params.push(("baud", baud.to_string()));
            }
            params.push(("fwUrl", link));
            if let Some(fw_type) = firmware.fw_type {
                params.push(("fwType", fw_type.to_string()));
            }
            if let Some(ver) = firmware.ver.as_ref().or(firmware.rev.as_ref()) {
                params.push(("fwVer", ver.clone()));
            }
            params.push(("fwCh", u8::from(!firmware.prod).to_string()));
            params.push(("zbChipIdx", idx.to_string()));

            if idx == 1
                && self
                    .core_version()
                    .is_some_and(|v| version_at_most(&v, LAST_CHIP_NUM_VERSION))
            {
                params.push(("zbChipNum", "5".to_owned()));
            }
            params
        } else {
            vec![
                ("action", Action::FlashEsp.id().to_string()),
                ("fwUrl", link),
            ]
        };
        debug!(mode = ?firmware.mode, idx, "starting firmware update");

        let body = self.get(&params, None).await?;
        Ok(body.as_deref() == Some("ok"))
    }
}

/// Model name the OTA service lists a radio under.
fn ota_model(device: &str, idx: u8) -> &str {
    if device == MULTI_RADIO_MODEL {
        if idx == 0 { "SLZB-06M" } else { "SLZB-06p7V2" }
    } else {
        device
    }
}

/// Render release notes for display.
///
/// Core notes are split into lines: the first becomes a heading and the
/// rest become `* ` bullets (lines already starting with `-` are kept as
/// is). Zigbee notes are kept whole, with a marker for dev builds.
pub fn format_notes(firmware: &Firmware) -> Option<String> {
    let notes = firmware.notes.as_deref().filter(|n| !n.is_empty())?;
    let zigbee = firmware.mode == Some(FirmwareMode::Zigbee);

    let lines: Vec<&str> = if zigbee {
        vec![notes]
    } else {
        notes
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    };

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 && !line.is_empty() && !line.starts_with('-') {
            out.push_str("* ");
            out.push_str(line);
            out.push('\n');
        } else {
            out.push_str(line);
            out.push_str("\n\n");
        }
    }

    if firmware.dev && zigbee {
        out.insert_str(0, "Dev firmware.\n\n");
    }
    Some(out)
}

/// Numeric components of a `v1.2.3`-style version.
fn version_parts(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

fn version_at_most(version: &str, max: &str) -> bool {
    version_parts(version) <= version_parts(max)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn esp_release(notes: &str) -> Firmware {
        Firmware {
            mode: Some(FirmwareMode::Esp),
            ver: Some("v2.5.2".into()),
            link: Some("https://localhost/firmware.bin".into()),
            notes: Some(notes.into()),
            ..Firmware::default()
        }
    }

    #[test]
    fn core_notes_become_bullets() {
        let fw = esp_release("CHANGELOG v2.5.2\r\nFixed bug with the lights\nMore fixes");
        assert_eq!(
            format_notes(&fw).as_deref(),
            Some("CHANGELOG v2.5.2\n\n* Fixed bug with the lights\n* More fixes\n")
        );
    }

    #[test]
    fn dashed_and_blank_lines_are_not_bulleted() {
        let fw = esp_release("v2.6.0\n- already listed\n\nnew line");
        assert_eq!(
            format_notes(&fw).as_deref(),
            Some("v2.6.0\n\n- already listed\n\n\n\n* new line\n")
        );
    }

    #[test]
    fn zigbee_notes_are_kept_whole() {
        let mut fw = Firmware {
            mode: Some(FirmwareMode::Zigbee),
            notes: Some("Line one\nLine two".into()),
            dev: true,
            ..Firmware::default()
        };
        assert_eq!(
            format_notes(&fw).as_deref(),
            Some("Dev firmware.\n\nLine one\nLine two\n\n")
        );

        fw.notes = None;
        assert_eq!(format_notes(&fw), None);
    }

    #[test]
    fn multi_radio_model_mapping() {
        assert_eq!(ota_model("SLZB-MR1", 0), "SLZB-06M");
        assert_eq!(ota_model("SLZB-MR1", 1), "SLZB-06p7V2");
        assert_eq!(ota_model("SLZB-06p10", 1), "SLZB-06p10");
    }

    #[test]
    fn version_comparison() {
        assert!(version_at_most("v2.7.2", "v2.7.2"));
        assert!(version_at_most("v2.3.6", "v2.7.2"));
        assert!(version_at_most("v2.7", "v2.7.2"));
        assert!(!version_at_most("v2.7.3", "v2.7.2"));
        assert!(!version_at_most("v2.10.0", "v2.7.2"));
        assert!(version_at_most("v2.7.2.dev3", "v2.7.2.dev4"));
    }
}
