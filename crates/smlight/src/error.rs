//! CLI error types with miette diagnostics.
//!
//! Maps `smlight_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use smlight_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device")]
    #[diagnostic(
        code(smlight::connection_failed),
        help(
            "Check that the device is powered and reachable.\n\
             Reason: {reason}\n\
             Try: smlight --host <ip> info"
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(smlight::auth_failed),
        help(
            "The device has web authentication enabled.\n\
             Pass --username and --password (or SMLIGHT_PASSWORD), or set them in profile '{profile}'."
        )
    )]
    AuthFailed { profile: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(smlight::no_credentials),
        help("Set password_env or password in the profile, or export SMLIGHT_PASSWORD.")
    )]
    NoCredentials { profile: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device firmware is too old for this command")]
    #[diagnostic(
        code(smlight::legacy_firmware),
        help("Update the core firmware from the device web UI. `smlight watch` still works.")
    )]
    LegacyFirmware,

    #[error("Device rejected '{command}'")]
    #[diagnostic(code(smlight::rejected))]
    Rejected { command: String },

    #[error("Device API error ({code}): {message}")]
    #[diagnostic(code(smlight::api_error))]
    ApiError { code: String, message: String },

    #[error("Operation not supported: {operation}")]
    #[diagnostic(code(smlight::unsupported))]
    Unsupported { operation: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smlight::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(smlight::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Add a [profiles.{name}] table to the config file."
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(smlight::no_config),
        help(
            "Pass --host (or SMLIGHT_HOST), or create a config file at:\n{path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(smlight::config))]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(smlight::timeout),
        help("Increase timeout with --timeout or check device responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(smlight::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Unsupported { .. } | Self::LegacyFirmware => exit_code::UNSUPPORTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library errors → CliError ────────────────────────────────────────

impl From<smlight_api::Error> for CliError {
    fn from(err: smlight_api::Error) -> Self {
        use smlight_api::Error as ApiError;

        match err {
            ApiError::Authentication { .. } => Self::AuthFailed {
                profile: "current".into(),
            },
            ApiError::Connection(reason) | ApiError::Stream(reason) => {
                Self::ConnectionFailed { reason }
            }
            ApiError::Transport(e) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            ApiError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            ApiError::Api { status, message } => Self::ApiError {
                code: status.to_string(),
                message,
            },
            ApiError::LegacyFirmware => Self::LegacyFirmware,
            ApiError::Deserialization { message, .. } => Self::ApiError {
                code: "decode".into(),
                message,
            },
            ApiError::UnsupportedOperation(operation) => Self::Unsupported {
                operation: operation.into(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let auth: CliError = smlight_api::Error::Authentication {
            message: "nope".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let conn: CliError = smlight_api::Error::Connection("refused".into()).into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);

        let legacy: CliError = smlight_api::Error::LegacyFirmware.into();
        assert_eq!(legacy.exit_code(), exit_code::UNSUPPORTED);
    }

    #[test]
    fn config_errors_keep_their_meaning() {
        let err: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert!(matches!(err, CliError::NoCredentials { ref profile } if profile == "lab"));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
