// Device info endpoints
//
// Static device information, live sensor readings, settings pages, and
// single parameter reads.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::{Action, PARAM_LIST, Page};
use crate::device::client::DeviceClient;
use crate::error::Error;
use crate::models::{Info, Sensors};

/// Firmware answer on `/ha_info` when the endpoint only exists under the
/// old `/api` path.
const URL_NOT_FOUND: &str = "URL NOT FOUND";

#[derive(Deserialize)]
struct InfoEnvelope {
    #[serde(rename = "Info")]
    info: Info,
}

#[derive(Deserialize)]
struct SensorsEnvelope {
    #[serde(rename = "Sensors")]
    sensors: Sensors,
}

impl DeviceClient {
    /// Get static device information.
    ///
    /// `GET /ha_info`
    ///
    /// Firmware without this endpoint is flagged as legacy on the event
    /// client (extending its read timeout) and reported as
    /// [`Error::LegacyFirmware`].
    pub async fn get_info(&self) -> Result<Info, Error> {
        debug!("fetching device info");
        let body = match self.get(&[], Some(self.info_url())).await? {
            None => return Err(self.mark_legacy()),
            Some(body) if body.trim() == URL_NOT_FOUND => {
                self.use_legacy_api_path()?;
                return Err(self.mark_legacy());
            }
            Some(body) => body,
        };

        let envelope: InfoEnvelope =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;
        if let Some(version) = envelope.info.sw_version.as_deref() {
            self.record_core_version(version);
        }
        Ok(envelope.info)
    }

    fn mark_legacy(&self) -> Error {
        warn!(host = %self.host(), "device firmware predates /ha_info");
        self.sse().set_legacy_api(true);
        Error::LegacyFirmware
    }

    /// Get live sensor values and toggle states.
    ///
    /// `GET /ha_sensors`
    pub async fn get_sensors(&self) -> Result<Sensors, Error> {
        debug!("fetching sensors");
        let Some(body) = self.get(&[], Some(self.sensors_url())).await? else {
            return Err(Error::LegacyFirmware);
        };

        let envelope: SensorsEnvelope =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;
        Ok(envelope.sensors)
    }

    /// Read the values of one settings page.
    ///
    /// `GET /api2?action=0&page=N`
    ///
    /// Returns `None` when the device has nothing for the page.
    pub async fn get_page(&self, page: Page) -> Result<Option<serde_json::Value>, Error> {
        let params = [
            ("action", Action::GetPage.id().to_string()),
            ("page", page.id().to_string()),
        ];
        debug!(page = %page, "fetching settings page");
        let Some(body) = self.get(&params, None).await? else {
            return Ok(None);
        };

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;
        Ok(is_present(&value).then_some(value))
    }

    /// Read a single device parameter.
    ///
    /// `GET /api2?action=1&param=NAME`
    ///
    /// Only the names in [`PARAM_LIST`] are queried; anything else returns
    /// `None` without a request.
    pub async fn get_param(&self, param: &str) -> Result<Option<String>, Error> {
        if !PARAM_LIST.contains(&param) {
            debug!(param, "parameter not readable, skipping request");
            return Ok(None);
        }

        let params = [
            ("action", Action::GetParam.id().to_string()),
            ("param", param.to_owned()),
        ];
        self.get(&params, None).await
    }
}

/// JSON truthiness: empty objects, arrays, strings, and `null` count as
/// absent.
fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_pages_are_absent() {
        assert!(!is_present(&json!({})));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!(null)));
        assert!(is_present(&json!({"disableLeds": false})));
    }
}
