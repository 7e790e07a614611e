use super::*;

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("device_sim_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(SETTINGS_FILE);
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(Path::new("/nonexistent/device_sim.toml"), no_env);
    assert_eq!(settings.bind, "127.0.0.1:8080");
    assert_eq!(settings.latency, Duration::ZERO);
    assert_eq!(settings.initial_mode, Mode::Stop);
    assert_eq!(settings.initial_target.value(), 21);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "bind_addr = \"0.0.0.0:9000\"\nlatency_ms = 750\nmode = \"auto\"\ntarget_temp = 24\nroom_temp = 17.0\n",
    );

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.bind, "0.0.0.0:9000");
    assert_eq!(settings.latency, Duration::from_millis(750));
    assert_eq!(settings.initial_mode, Mode::Auto);
    assert_eq!(settings.initial_target.value(), 24);
    assert_eq!(settings.initial_room_temp, 17.0);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn env_overrides_file_and_ignores_garbage() {
    let path = temp_settings_file("bind_addr = \"0.0.0.0:9000\"\nlatency_ms = 750\n");
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__BIND_ADDR", "127.0.0.1:9100"),
        ("SIM_LATENCY_MS", "soon"),
        ("SIM_MODE", "close"),
    ]);

    let settings = load_settings_from(&path, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.bind, "127.0.0.1:9100");
    assert_eq!(settings.latency, Duration::from_millis(750));
    assert_eq!(settings.initial_mode, Mode::Close);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn out_of_range_target_in_file_discards_the_file() {
    let path = temp_settings_file("target_temp = 45\nlatency_ms = 10\n");

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.initial_target.value(), 21);
    assert_eq!(settings.latency, Duration::ZERO);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
