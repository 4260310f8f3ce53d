// Device HTTP client
//
// Wraps `reqwest::Client` with SLZB-06x URL construction, Basic auth, and
// the device's status conventions. Endpoint groups (info, commands,
// firmware) are implemented as inherent methods in sibling files so this
// module only deals with transport mechanics.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::constants::{Action, RESP_VALUES_HEADER};
use crate::error::Error;
use crate::sse::{SseClient, SseConfig};
use crate::transport::TransportConfig;

/// Per-host endpoint URLs.
#[derive(Debug, Clone)]
struct Urls {
    api: Url,
    settings: Url,
    info: Url,
    sensors: Url,
}

impl Urls {
    fn for_host(host: &str) -> Result<Self, Error> {
        let base = Url::parse(&format!("http://{host}/"))?;
        Ok(Self {
            api: base.join("api2")?,
            settings: base.join("settings/saveParams")?,
            info: base.join("ha_info")?,
            sensors: base.join("ha_sensors")?,
        })
    }
}

/// HTTP client for one SLZB-06x device.
///
/// Owns the [`SseClient`] for the same device so the two stay pointed at
/// the same host and share credentials. All methods take `&self`; the
/// client can be shared behind an `Arc`.
pub struct DeviceClient {
    http: reqwest::Client,
    host: RwLock<String>,
    urls: RwLock<Urls>,
    credentials: RwLock<Option<Credentials>>,
    request_timeout: Duration,
    firmware_url: Url,
    /// Core firmware version, recorded by the first successful `get_info`.
    core_version: RwLock<Option<String>>,
    sse: Arc<SseClient>,
}

impl DeviceClient {
    /// Create a client for `host` (hostname or `ip[:port]`) with its own
    /// HTTP connection pool.
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::build(http, host, transport.request_timeout)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The client must not carry a total timeout, since the event stream
    /// shares it.
    pub fn with_client(http: reqwest::Client, host: &str) -> Result<Self, Error> {
        Self::build(http, host, TransportConfig::default().request_timeout)
    }

    fn build(http: reqwest::Client, host: &str, request_timeout: Duration) -> Result<Self, Error> {
        let urls = Urls::for_host(host)?;
        let sse = SseClient::new(
            http.clone(),
            SseClient::events_url(host)?,
            SseConfig::default(),
        );
        Ok(Self {
            http,
            host: RwLock::new(host.to_owned()),
            urls: RwLock::new(urls),
            credentials: RwLock::new(None),
            request_timeout,
            firmware_url: Url::parse(crate::constants::FW_URL)?,
            core_version: RwLock::new(None),
            sse: Arc::new(sse),
        })
    }

    /// Use an existing event client instead of the default one.
    #[must_use]
    pub fn with_sse(mut self, sse: Arc<SseClient>) -> Self {
        sse.set_credentials(self.credentials());
        self.sse = sse;
        self
    }

    /// Query a different OTA metadata service.
    #[must_use]
    pub fn with_firmware_url(mut self, url: Url) -> Self {
        self.firmware_url = url;
        self
    }

    pub fn host(&self) -> String {
        self.host
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The underlying HTTP client, e.g. for building a custom event client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Event client for this device.
    pub fn sse(&self) -> &Arc<SseClient> {
        &self.sse
    }

    /// Core firmware version reported by the device, once known.
    pub fn core_version(&self) -> Option<String> {
        self.core_version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point the client (and its event client) at a different host.
    pub fn set_host(&self, host: &str) -> Result<(), Error> {
        let urls = Urls::for_host(host)?;
        let events = SseClient::events_url(host)?;
        debug!(host, "switching device host");

        *self.urls.write().unwrap_or_else(PoisonError::into_inner) = urls;
        *self.host.write().unwrap_or_else(PoisonError::into_inner) = host.to_owned();
        self.sse.set_url(events);
        Ok(())
    }

    // ── URL accessors ────────────────────────────────────────────────

    fn urls(&self) -> Urls {
        self.urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn api_url(&self) -> Url {
        self.urls().api
    }

    pub(crate) fn info_url(&self) -> Url {
        self.urls().info
    }

    pub(crate) fn sensors_url(&self) -> Url {
        self.urls().sensors
    }

    pub(crate) fn firmware_url(&self) -> Url {
        self.firmware_url.clone()
    }

    /// Switch the command endpoint from `/api2` to the pre-`/api2` path
    /// used by legacy firmware.
    pub(crate) fn use_legacy_api_path(&self) -> Result<(), Error> {
        let host = self.host();
        let legacy = Url::parse(&format!("http://{host}/api"))?;
        self.urls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .api = legacy;
        Ok(())
    }

    pub(crate) fn record_core_version(&self, version: &str) {
        let mut current = self
            .core_version
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if current.is_none() {
            debug!(version, "recorded core firmware version");
            *current = Some(version.to_owned());
        }
    }

    // ── Authentication ───────────────────────────────────────────────

    fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials() {
            Some(credentials) => credentials.apply(builder),
            None => builder,
        }
    }

    /// Probe whether the device requires credentials.
    ///
    /// With `authenticate` set, the stored credentials are sent and a 401
    /// is reported as [`Error::Authentication`] instead of `true`.
    pub async fn check_auth_needed(&self, authenticate: bool) -> Result<bool, Error> {
        let url = self.api_url();
        let params = [
            ("action", Action::GetPage.id().to_string()),
            ("page", "1".to_owned()),
        ];
        debug!(authenticate, "checking whether device needs auth");

        let mut builder = self
            .http
            .get(url)
            .query(&params)
            .timeout(self.request_timeout);
        if authenticate {
            builder = self.apply_auth(builder);
        }
        let resp = builder.send().await.map_err(|e| Error::connection(&e))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            if authenticate {
                return Err(Error::Authentication {
                    message: "wrong login or password".into(),
                });
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Store Basic credentials and verify them against the device.
    ///
    /// The credentials are kept (and shared with the event client) even
    /// when verification fails.
    pub async fn authenticate(&self, username: &str, password: SecretString) -> Result<bool, Error> {
        let credentials = Credentials::new(username, password);
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        self.sse.set_credentials(Some(credentials));

        Ok(!self.check_auth_needed(true).await?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Whether `url` points at the device itself (same host and port).
    fn is_device_url(&self, url: &Url) -> bool {
        let device = self.api_url();
        url.host_str() == device.host_str()
            && url.port_or_known_default() == device.port_or_known_default()
    }

    /// Send a GET request and return the body as text.
    ///
    /// Defaults to the command endpoint. `Ok(None)` means HTTP 404. For
    /// page reads the values arrive in the `respValuesArr` header, which is
    /// returned in place of the body when present. Credentials are only
    /// sent to the device; other hosts (the OTA service) get none.
    pub(crate) async fn get(
        &self,
        params: &[(&str, String)],
        url: Option<Url>,
    ) -> Result<Option<String>, Error> {
        let url = url.unwrap_or_else(|| self.api_url());
        debug!("GET {}", url);

        let to_device = self.is_device_url(&url);
        let mut builder = self
            .http
            .get(url)
            .query(params)
            .timeout(self.request_timeout);
        if to_device {
            builder = self.apply_auth(builder);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| Error::connection(&e))?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED => {
                return Err(Error::Authentication {
                    message: "device rejected credentials".into(),
                });
            }
            _ => {}
        }

        if is_page_request(params) {
            let values = resp
                .headers()
                .get(RESP_VALUES_HEADER)
                .and_then(|v| v.to_str().ok());
            if let Some(values) = values {
                trace!("using {RESP_VALUES_HEADER} header");
                return Ok(Some(values.to_owned()));
            }
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        Ok(Some(body))
    }

    /// POST a url-encoded form to the settings endpoint.
    ///
    /// Returns `true` when the device answers HTTP 200.
    pub(crate) async fn post(&self, params: &[(&str, String)]) -> Result<bool, Error> {
        let url = self.urls().settings;
        debug!("POST {}", url);

        let builder = self
            .http
            .post(url)
            .form(params)
            .timeout(self.request_timeout);
        let resp = self
            .apply_auth(builder)
            .send()
            .await
            .map_err(|e| Error::connection(&e))?;

        let status = resp.status();
        match status {
            StatusCode::NOT_FOUND => return Err(Error::Connection("endpoint not found".into())),
            StatusCode::UNAUTHORIZED => {
                return Err(Error::Authentication {
                    message: "device rejected credentials".into(),
                });
            }
            _ => {}
        }

        // Drain the body so the connection can be reused.
        let _ = resp.text().await.map_err(Error::Transport)?;
        Ok(status == StatusCode::OK)
    }
}

fn is_page_request(params: &[(&str, String)]) -> bool {
    params
        .iter()
        .find(|(key, _)| *key == "action")
        .and_then(|(_, value)| value.parse::<u8>().ok())
        == Some(Action::GetPage.id())
}

impl std::fmt::Debug for DeviceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceClient")
            .field("host", &self.host())
            .field("authenticated", &self.credentials().is_some())
            .field("core_version", &self.core_version())
            .field("sse", &self.sse)
            .finish_non_exhaustive()
    }
}
