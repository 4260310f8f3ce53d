//! Shared configuration for SMLIGHT tools.
//!
//! TOML profiles (one per device), credential resolution (env +
//! plaintext), and translation to the client settings `smlight-api`
//! takes. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use smlight_api::{Credentials, SseConfig, TransportConfig};

/// Environment variable consulted for the device password when the
/// profile names none.
pub const PASSWORD_ENV: &str = "SMLIGHT_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(name, profile)| (name.as_str(), profile))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Event stream read timeout in seconds.
    #[serde(default = "default_sse_timeout")]
    pub sse_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            sse_timeout: default_sse_timeout(),
        }
    }
}

fn default_output() -> String {
    "plain".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_sse_timeout() -> u64 {
    30
}

/// A named device profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Device hostname or `ip[:port]` (e.g., "slzb-06.local").
    pub host: String,

    /// Username for devices with web-UI authentication enabled.
    pub username: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override request timeout.
    pub timeout: Option<u64>,

    /// Override event stream read timeout.
    pub sse_timeout: Option<u64>,

    /// Treat the device as running legacy firmware from the start.
    #[serde(default)]
    pub legacy_api: bool,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tech", "smlight", "smlight").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("smlight");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file is not an error.
///
/// Environment keys use the `SMLIGHT_` prefix with `__` as the nesting
/// separator, e.g. `SMLIGHT_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SMLIGHT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve Basic credentials for a profile.
///
/// `Ok(None)` when the profile has no username (device without auth).
/// The password comes from, in order: the profile's `password_env`
/// variable, [`PASSWORD_ENV`], the plaintext `password` field.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };

    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(Some(Credentials::new(username, SecretString::from(val))));
        }
    }

    // 2. Shared env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(Some(Credentials::new(username, SecretString::from(val))));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(Some(Credentials::new(username, SecretString::from(pw.clone()))));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to client settings ──────────────────────────────────

/// Everything needed to construct a `DeviceClient` for one profile.
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub host: String,
    pub credentials: Option<Credentials>,
    pub transport: TransportConfig,
    pub sse: SseConfig,
    pub legacy_api: bool,
}

/// Build client settings from a profile, with no CLI flag overrides.
pub fn profile_to_device_settings(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DeviceSettings, ConfigError> {
    validate_host(&profile.host)?;

    let credentials = resolve_credentials(profile, profile_name)?;
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let sse_timeout = Duration::from_secs(profile.sse_timeout.unwrap_or(defaults.sse_timeout));

    Ok(DeviceSettings {
        host: profile.host.clone(),
        credentials,
        transport: TransportConfig::default().with_request_timeout(timeout),
        sse: SseConfig {
            timeout: sse_timeout,
            ..SseConfig::default()
        },
        legacy_api: profile.legacy_api,
    })
}

/// Check that `host` can be used as the authority of a device URL.
pub fn validate_host(host: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: "host".into(),
        reason,
    };

    if host.trim().is_empty() {
        return Err(invalid("host is empty".into()));
    }
    if host.contains("://") || host.contains('/') {
        return Err(invalid(format!(
            "expected a hostname or ip[:port], got '{host}'"
        )));
    }
    url::Url::parse(&format!("http://{host}/"))
        .map(|_| ())
        .map_err(|e| invalid(format!("'{host}': {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(host: &str) -> Profile {
        Profile {
            host: host.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 10

[profiles.lab]
host = "192.168.1.40"
username = "admin"
password = "hunter2"
sse_timeout = 45
legacy_api = true
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.sse_timeout, 30);
        assert_eq!(config.defaults.output, "plain");

        let (name, lab) = config.profile(None).unwrap();
        assert_eq!(name, "lab");
        assert_eq!(lab.host, "192.168.1.40");
        assert_eq!(lab.sse_timeout, Some(45));
        assert!(lab.legacy_api);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert!(matches!(
            config.profile(Some("lab")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert("default".into(), profile("slzb-06.local"));

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].host, "slzb-06.local");
    }

    #[test]
    fn credentials_need_a_username() {
        assert!(resolve_credentials(&profile("slzb-06.local"), "default")
            .unwrap()
            .is_none());
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let p = Profile {
            username: Some("admin".into()),
            password: Some("hunter2".into()),
            password_env: Some("SMLIGHT_TEST_UNSET_PASSWORD_VAR".into()),
            ..profile("slzb-06.local")
        };
        let creds = resolve_credentials(&p, "default").unwrap().unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[test]
    fn settings_apply_profile_overrides() {
        let p = Profile {
            timeout: Some(5),
            sse_timeout: Some(90),
            legacy_api: true,
            ..profile("slzb-06.local:8080")
        };
        let settings = profile_to_device_settings(&p, "default", &Defaults::default()).unwrap();

        assert_eq!(settings.host, "slzb-06.local:8080");
        assert_eq!(settings.transport.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.sse.timeout, Duration::from_secs(90));
        assert_eq!(settings.sse.legacy_timeout, Duration::from_secs(600));
        assert!(settings.legacy_api);
        assert!(settings.credentials.is_none());
    }

    #[test]
    fn host_validation() {
        assert!(validate_host("slzb-06.local").is_ok());
        assert!(validate_host("192.168.1.40:8080").is_ok());
        assert!(validate_host("").is_err());
        assert!(validate_host("http://slzb-06.local").is_err());
        assert!(validate_host("slzb-06.local/api2").is_err());
    }
}
