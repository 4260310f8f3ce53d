use thiserror::Error;

/// Top-level error type for the `smlight-api` crate.
///
/// Covers every failure mode of the HTTP control plane: authentication,
/// transport, device responses, and payload decoding. The SSE event loop
/// never returns these to its caller; it logs them and reconnects.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Device rejected the request with HTTP 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Device could not be reached, or an endpoint the client relies on
    /// is missing.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// HTTP transport error surfaced by reqwest.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request or stream read timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Event stream ended with a protocol or decoding fault.
    #[error("Event stream error: {0}")]
    Stream(String),

    // ── Device API ──────────────────────────────────────────────────
    /// Device answered with an unexpected HTTP status.
    #[error("Device API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Device runs firmware that predates the `ha_info` endpoints.
    #[error("Device firmware predates the HA info API")]
    LegacyFirmware,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Operation not supported for this device or firmware.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    /// Returns `true` if the device asked for (valid) credentials.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Connection(_) | Self::Timeout { .. } | Self::Stream(_) => true,
            _ => false,
        }
    }

    /// Wrap a transport failure into a [`Error::Connection`], keeping the
    /// timeout distinction.
    pub(crate) fn connection(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Connection(format!("timed out: {err}"))
        } else {
            Self::Connection(err.to_string())
        }
    }

    /// Build a [`Error::Deserialization`] with a truncated body preview.
    pub(crate) fn deserialization(err: &serde_json::Error, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::Deserialization {
            message: format!("{err} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    }
}
