use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("remote_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("remote.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn cleanup(path: &Path) {
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn defaults_point_at_the_lan_device() {
    let overrides = Overrides {
        config_path: None,
        ..Overrides::default()
    };
    let settings = load_settings_with_env(&overrides, no_env).expect("settings");
    assert_eq!(settings.device_url, "http://192.168.1.195");
    assert_eq!(settings.poll_interval, Duration::from_secs(10));
    assert_eq!(settings.request_timeout, None);
}

#[test]
fn file_then_env_then_cli() {
    let path = temp_config(
        "device_url = \"http://10.0.0.5\"\npoll_interval_ms = 2000\nrequest_timeout_ms = 1500\n",
    );
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__DEVICE_URL", "http://10.0.0.6"),
        ("APP__POLL_INTERVAL_MS", "3000"),
    ]);
    let env_fn = |key: &str| vars.get(key).map(|v| v.to_string());

    let overrides = Overrides {
        config_path: Some(path.clone()),
        ..Overrides::default()
    };
    let settings = load_settings_with_env(&overrides, env_fn).expect("settings");
    assert_eq!(settings.device_url, "http://10.0.0.6");
    assert_eq!(settings.poll_interval, Duration::from_millis(3000));
    assert_eq!(settings.request_timeout, Some(Duration::from_millis(1500)));

    let overrides = Overrides {
        config_path: Some(path.clone()),
        device_url: Some("http://127.0.0.1:8080".to_string()),
        poll_interval_ms: Some(500),
        request_timeout_ms: None,
    };
    let settings = load_settings_with_env(&overrides, env_fn).expect("settings");
    assert_eq!(settings.device_url, "http://127.0.0.1:8080");
    assert_eq!(settings.poll_interval, Duration::from_millis(500));

    cleanup(&path);
}

#[test]
fn garbage_numeric_env_values_are_ignored() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__POLL_INTERVAL_MS", "often"),
        ("APP__REQUEST_TIMEOUT_MS", "-1"),
    ]);
    let settings = load_settings_with_env(&Overrides::default(), |key| {
        vars.get(key).map(|v| v.to_string())
    })
    .expect("settings");
    assert_eq!(settings.poll_interval, Duration::from_secs(10));
    assert_eq!(settings.request_timeout, None);
}

#[test]
fn explicit_config_path_must_exist() {
    let overrides = Overrides {
        config_path: Some(PathBuf::from("/nonexistent/remote.toml")),
        ..Overrides::default()
    };
    let err = load_settings_with_env(&overrides, no_env).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn unknown_keys_are_rejected() {
    let path = temp_config("device = \"http://10.0.0.5\"\n");
    let overrides = Overrides {
        config_path: Some(path.clone()),
        ..Overrides::default()
    };
    let err = load_settings_with_env(&overrides, no_env).expect_err("unknown key");
    assert!(err.to_string().contains("failed to parse config"));
    cleanup(&path);
}

#[test]
fn invalid_values_fail_validation() {
    let cases = [
        Overrides {
            device_url: Some("192.168.1.195".to_string()),
            ..Overrides::default()
        },
        Overrides {
            device_url: Some("ftp://192.168.1.195".to_string()),
            ..Overrides::default()
        },
        Overrides {
            poll_interval_ms: Some(0),
            ..Overrides::default()
        },
        Overrides {
            request_timeout_ms: Some(0),
            ..Overrides::default()
        },
    ];
    for overrides in cases {
        assert!(
            load_settings_with_env(&overrides, no_env).is_err(),
            "{overrides:?} should be rejected"
        );
    }
}
