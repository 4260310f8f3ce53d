// SSE connection manager
//
// Owns the long-lived `/events` connection. `run()` loops forever:
// connect → read → on close reconnect immediately, on failure pause then
// reconnect. Nothing escapes the loop; callers stop it by cancelling the
// task that drives it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use super::dispatch::dispatch;
use super::event::{EventKind, MessageEvent};
use super::parse::EventDecoder;
use super::registry::{CallbackRegistry, Disposer};
use super::settings::{Setting, SettingsEvent};
use crate::auth::Credentials;
use crate::error::Error;

// ── SseConfig ────────────────────────────────────────────────────────

/// Timeout and retry policy for the event stream.
#[derive(Debug, Clone)]
pub struct SseConfig {
    /// Read timeout for devices that send periodic keep-alives. Default: 30s.
    pub timeout: Duration,

    /// Read timeout once the device is flagged as legacy firmware, which
    /// never sends keep-alives. Default: 600s.
    pub legacy_timeout: Duration,

    /// Fixed pause after a timeout or connection failure. Default: 5s.
    pub retry_delay: Duration,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            legacy_timeout: Duration::from_secs(600),
            retry_delay: Duration::from_secs(5),
        }
    }
}

// ── SseClient ────────────────────────────────────────────────────────

/// Event stream client for one device.
///
/// Callbacks run inline on the task driving [`run`](Self::run), in wire
/// order. A slow callback delays the next read and can trip the read
/// timeout; spawn long work instead of doing it in the callback.
pub struct SseClient {
    http: reqwest::Client,
    url: RwLock<Url>,
    credentials: RwLock<Option<Credentials>>,
    config: SseConfig,
    timeout_ms: AtomicU64,
    legacy_api: AtomicBool,
    registry: Arc<CallbackRegistry>,
}

impl SseClient {
    /// Create a client for the given `/events` URL.
    pub fn new(http: reqwest::Client, url: Url, config: SseConfig) -> Self {
        let timeout_ms = duration_ms(config.timeout);
        Self {
            http,
            url: RwLock::new(url),
            credentials: RwLock::new(None),
            config,
            timeout_ms: AtomicU64::new(timeout_ms),
            legacy_api: AtomicBool::new(false),
            registry: Arc::new(CallbackRegistry::default()),
        }
    }

    /// Event endpoint for a device host, e.g. `http://slzb-06.local/events`.
    pub fn events_url(host: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("http://{host}/events"))?)
    }

    // ── Configuration ────────────────────────────────────────────────

    pub fn url(&self) -> Url {
        self.url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Point the client at a new URL. Takes effect on the next connection.
    pub fn set_url(&self, url: Url) {
        *self.url.write().unwrap_or_else(PoisonError::into_inner) = url;
    }

    /// Basic credentials sent when opening the stream.
    pub fn set_credentials(&self, credentials: Option<Credentials>) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// Active read timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Relaxed))
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_ms.store(duration_ms(timeout), Ordering::Relaxed);
    }

    pub fn legacy_api(&self) -> bool {
        self.legacy_api.load(Ordering::Relaxed)
    }

    /// Mark the device as running legacy firmware. The next connection
    /// uses the extended read timeout.
    pub fn set_legacy_api(&self, legacy: bool) {
        self.legacy_api.store(legacy, Ordering::Relaxed);
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Register the callback for an event kind, replacing any existing one.
    ///
    /// `None` is accepted as an alias for [`EventKind::CatchAll`].
    pub fn register_callback<F>(&self, kind: impl Into<Option<EventKind>>, callback: F) -> Disposer
    where
        F: Fn(&MessageEvent) + Send + Sync + 'static,
    {
        let kind = kind.into().unwrap_or(EventKind::CatchAll);
        self.registry.register_event(kind, Arc::new(callback))
    }

    pub fn deregister_callback(&self, kind: impl Into<Option<EventKind>>) {
        let kind = kind.into().unwrap_or(EventKind::CatchAll);
        self.registry.deregister_event(kind);
    }

    /// Register the callback for one setting, replacing any existing one.
    pub fn register_settings_callback<F>(&self, setting: Setting, callback: F) -> Disposer
    where
        F: Fn(&SettingsEvent) + Send + Sync + 'static,
    {
        self.registry.register_setting(setting, Arc::new(callback))
    }

    pub fn deregister_settings_callback(&self, setting: Setting) {
        self.registry.deregister_setting(setting);
    }

    /// Number of registered event callbacks (catch-all included).
    pub fn callback_count(&self) -> usize {
        self.registry.event_count()
    }

    pub fn settings_callback_count(&self) -> usize {
        self.registry.settings_count()
    }

    /// Route one event to the registered callbacks.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &MessageEvent) -> usize {
        dispatch(event, &self.registry)
    }

    // ── Connection loop ──────────────────────────────────────────────

    /// Keep the event stream connected, forever.
    ///
    /// Never returns. Drop the future (or abort its task) to stop; the
    /// open connection is released with it.
    pub async fn run(&self) {
        let mut failures: u32 = 0;

        loop {
            self.apply_timeout_policy();

            match self.stream_once().await {
                // Server ended the response; reconnect immediately.
                Ok(()) => {
                    debug!("event stream closed, reconnecting");
                    failures = 0;
                }
                Err(Error::Timeout { timeout_secs }) => {
                    debug!(timeout_secs, "event stream read timed out");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    if failures == 0 {
                        warn!(error = %e, "event stream failed");
                    } else {
                        debug!(error = %e, failures, "event stream still failing");
                    }
                    failures = failures.saturating_add(1);
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the tokio runtime, stopping when
    /// `cancel` fires.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => debug!("event stream cancelled"),
                () = client.run() => {}
            }
        })
    }

    /// Raise the read timeout for legacy firmware.
    fn apply_timeout_policy(&self) {
        if self.legacy_api() && self.timeout() < self.config.legacy_timeout {
            info!(
                timeout_secs = self.config.legacy_timeout.as_secs(),
                "legacy firmware, extending event stream timeout"
            );
            self.set_timeout(self.config.legacy_timeout);
        }
    }

    /// One connection lifecycle: open the stream and dispatch events until
    /// it ends.
    ///
    /// `Ok(())` means the server closed the stream cleanly. A read that
    /// stalls longer than the active timeout yields [`Error::Timeout`].
    pub async fn stream_once(&self) -> Result<(), Error> {
        let url = self.url();
        let timeout = self.timeout();
        debug!(url = %url, "connecting to event stream");

        let credentials = self
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let mut request = self.http.get(url).header(ACCEPT, "text/event-stream");
        if let Some(credentials) = &credentials {
            request = credentials.apply(request);
        }

        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| timed_out(timeout))?
            .map_err(|e| Error::connection(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "event stream rejected credentials".into(),
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "event stream request rejected".into(),
            });
        }

        info!("event stream connected");

        let mut stream = response.bytes_stream();
        let mut decoder = EventDecoder::new();

        loop {
            let chunk = match tokio::time::timeout(timeout, stream.next()).await {
                Err(_) => return Err(timed_out(timeout)),
                Ok(None) => return Ok(()),
                Ok(Some(Err(e))) => return Err(Error::connection(&e)),
                Ok(Some(Ok(chunk))) => chunk,
            };

            decoder.push(&chunk);
            while let Some(event) = decoder.next_event() {
                trace!(event_type = %event.event_type, data = %event.data, "event received");
                self.dispatch(&event);
            }
            decoder.check_limit()?;
        }
    }
}

impl std::fmt::Debug for SseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseClient")
            .field("url", &self.url().as_str())
            .field("timeout", &self.timeout())
            .field("legacy_api", &self.legacy_api())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Timeout error with the duration rounded up to whole seconds.
fn timed_out(timeout: Duration) -> Error {
    Error::Timeout {
        timeout_secs: timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
