//! CLI configuration: profile selection and flag overrides on top of
//! `smlight-config`.

use std::time::Duration;

use secrecy::SecretString;

use smlight_api::Credentials;
use smlight_config::{Config, DeviceSettings, PASSWORD_ENV, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build device settings from the config file, profile, and CLI overrides.
pub fn resolve_device_settings(global: &GlobalOpts) -> Result<DeviceSettings, CliError> {
    let cfg = smlight_config::load_config_or_default();
    resolve_with_config(global, &cfg)
}

fn resolve_with_config(global: &GlobalOpts, cfg: &Config) -> Result<DeviceSettings, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut settings = if let Some(profile) = cfg.profiles.get(&profile_name) {
        // 1. Host (flag > env > profile)
        let profile = match global.host {
            Some(ref host) => Profile {
                host: host.clone(),
                ..profile.clone()
            },
            None => profile.clone(),
        };
        smlight_config::profile_to_device_settings(&profile, &profile_name, &cfg.defaults)?
    } else {
        if global.profile.is_some() {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }

        // No profile: build from flags / env vars alone
        let host = global.host.clone().ok_or_else(|| CliError::NoConfig {
            path: smlight_config::config_path().display().to_string(),
        })?;
        let profile = Profile {
            host,
            ..Profile::default()
        };
        smlight_config::profile_to_device_settings(&profile, &profile_name, &cfg.defaults)?
    };

    // 2. Credentials (flags replace the profile's)
    if let Some(ref username) = global.username {
        let password = global
            .password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
            .ok_or_else(|| CliError::NoCredentials {
                profile: profile_name.clone(),
            })?;
        settings.credentials = Some(Credentials::new(
            username.clone(),
            SecretString::from(password),
        ));
    }

    // 3. Timeout
    if let Some(secs) = global.timeout {
        settings.transport = settings
            .transport
            .with_request_timeout(Duration::from_secs(secs));
    }

    Ok(settings)
}
