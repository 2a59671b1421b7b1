use std::collections::HashMap;
use std::time::Duration;

use tasksync_core::{ReconnectPolicy, TaskId};
use tasksync_engine::{SettingsError, SyncSettings, API_URL_VAR, WS_URL_VAR};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = SyncSettings::default();
    assert_eq!(
        settings.task_url(&TaskId::from("abc")).unwrap().as_str(),
        "ws://localhost:8000/ws/abc"
    );
    assert_eq!(settings.reconnect, ReconnectPolicy::default());
    assert_eq!(settings.connect_timeout, Duration::from_secs(10));
}

#[test]
fn websocket_base_follows_api_url() {
    let settings = SyncSettings::from_lookup(lookup(&[(API_URL_VAR, "https://api.example.com/")]))
        .unwrap();
    assert_eq!(settings.api_base.as_str(), "https://api.example.com/");
    assert_eq!(
        settings.task_url(&TaskId::from("t1")).unwrap().as_str(),
        "wss://api.example.com/ws/t1"
    );
}

#[test]
fn explicit_websocket_url_wins() {
    let settings = SyncSettings::from_lookup(lookup(&[
        (API_URL_VAR, "http://api.internal"),
        (WS_URL_VAR, "ws://push.internal:9000/prefix/"),
    ]))
    .unwrap();
    assert_eq!(
        settings.task_url(&TaskId::from("t1")).unwrap().as_str(),
        "ws://push.internal:9000/prefix/ws/t1"
    );
    assert_eq!(
        settings.api_url(&["api", "v1", "upload-pdf", ""]).unwrap().as_str(),
        "http://api.internal/api/v1/upload-pdf/"
    );
}

#[test]
fn blank_variables_are_ignored() {
    let settings = SyncSettings::from_lookup(lookup(&[(WS_URL_VAR, "  ")])).unwrap();
    assert_eq!(settings, SyncSettings::default());
}

#[test]
fn task_ids_are_percent_encoded() {
    let url = SyncSettings::default()
        .task_url(&TaskId::from("a/b c"))
        .unwrap();
    assert_eq!(url.path(), "/ws/a%2Fb%20c");
}

#[test]
fn rejects_wrong_schemes_and_garbage() {
    let err = SyncSettings::default()
        .with_ws_base("http://localhost:8000")
        .unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedScheme { .. }));

    let err = SyncSettings::default().with_api_base("not a url").unwrap_err();
    assert!(matches!(err, SettingsError::InvalidUrl { .. }));
}
