use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::{Mode, TargetTemp};
use tracing::warn;

pub const SETTINGS_FILE: &str = "device_sim.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub latency: Duration,
    pub initial_mode: Mode,
    pub initial_target: TargetTemp,
    pub initial_room_temp: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
            latency: Duration::ZERO,
            initial_mode: Mode::Stop,
            initial_target: TargetTemp::saturating(21),
            initial_room_temp: 19.5,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    latency_ms: Option<u64>,
    mode: Option<Mode>,
    target_temp: Option<TargetTemp>,
    room_temp: Option<f64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("SIM_BIND") {
        settings.bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind = v;
    }

    if let Some(v) = env("SIM_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.latency = Duration::from_millis(parsed);
        }
    }

    if let Some(v) = env("SIM_MODE") {
        if let Ok(mode) = v.parse::<Mode>() {
            settings.initial_mode = mode;
        }
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind = v;
    }
    if let Some(v) = file_cfg.latency_ms {
        settings.latency = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.mode {
        settings.initial_mode = v;
    }
    if let Some(v) = file_cfg.target_temp {
        settings.initial_target = v;
    }
    if let Some(v) = file_cfg.room_temp {
        settings.initial_room_temp = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
