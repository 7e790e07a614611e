use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, ensure, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "remote.toml";
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.1.195";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_url: DEFAULT_DEVICE_URL.into(),
            poll_interval: client_core::DEFAULT_POLL_INTERVAL,
            request_timeout: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    device_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub device_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

pub fn load_settings(overrides: &Overrides) -> anyhow::Result<Settings> {
    load_settings_with_env(overrides, |key| std::env::var(key).ok())
}

fn load_settings_with_env(
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match &overrides.config_path {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    if let Some(file_cfg) = read_file(&path, required)? {
        if let Some(v) = file_cfg.device_url {
            settings.device_url = v;
        }
        if let Some(v) = file_cfg.poll_interval_ms {
            settings.poll_interval = Duration::from_millis(v);
        }
        if let Some(v) = file_cfg.request_timeout_ms {
            settings.request_timeout = Some(Duration::from_millis(v));
        }
    }

    if let Some(v) = env("REMOTE_DEVICE_URL") {
        settings.device_url = v;
    }
    if let Some(v) = env("APP__DEVICE_URL") {
        settings.device_url = v;
    }

    if let Some(v) = env("APP__POLL_INTERVAL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.poll_interval = Duration::from_millis(parsed);
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout = Some(Duration::from_millis(parsed));
        }
    }

    if let Some(v) = &overrides.device_url {
        settings.device_url = v.clone();
    }
    if let Some(v) = overrides.poll_interval_ms {
        settings.poll_interval = Duration::from_millis(v);
    }
    if let Some(v) = overrides.request_timeout_ms {
        settings.request_timeout = Some(Duration::from_millis(v));
    }

    validate(&settings)?;
    Ok(settings)
}

fn read_file(path: &Path, required: bool) -> anyhow::Result<Option<FileSettings>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) if !required => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()))
        }
    };
    let file_cfg = toml::from_str::<FileSettings>(&raw)
        .with_context(|| format!("failed to parse config '{}'", path.display()))?;
    Ok(Some(file_cfg))
}

fn validate(settings: &Settings) -> anyhow::Result<()> {
    let url = Url::parse(&settings.device_url)
        .with_context(|| format!("invalid device url '{}'", settings.device_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("device url must use http or https: '{}'", settings.device_url);
    }
    ensure!(
        !settings.poll_interval.is_zero(),
        "poll interval must be greater than zero"
    );
    if let Some(timeout) = settings.request_timeout {
        ensure!(!timeout.is_zero(), "request timeout must be greater than zero");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
