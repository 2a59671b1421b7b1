use std::time::Duration;

use tasksync_core::{ReconnectPolicy, TaskId};
use thiserror::Error;
use url::Url;

pub const WS_URL_VAR: &str = "TASKSYNC_WS_URL";
pub const API_URL_VAR: &str = "TASKSYNC_API_URL";

const DEFAULT_WS_BASE: &str = "ws://localhost:8000";
const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("invalid url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("url {value:?} must use one of {expected:?}")]
    UnsupportedScheme {
        value: String,
        expected: &'static [&'static str],
    },
    #[error("url {0:?} cannot carry a path")]
    NotABase(String),
}

/// Where to reach the backend and how patiently.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub ws_base: Url,
    pub api_base: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            ws_base: Url::parse(DEFAULT_WS_BASE).expect("default websocket base"),
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl SyncSettings {
    /// Defaults overridden by `TASKSYNC_WS_URL` and `TASKSYNC_API_URL`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SyncSettings::from_env`] with an injectable variable source.
    ///
    /// Without an explicit websocket url the websocket base is derived from
    /// the api url (`http` becomes `ws`, `https` becomes `wss`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Self::default();

        let api = non_empty(API_URL_VAR);
        if let Some(api) = &api {
            settings = settings.with_api_base(api)?;
        }
        match (non_empty(WS_URL_VAR), api) {
            (Some(ws), _) => settings = settings.with_ws_base(&ws)?,
            (None, Some(api)) => settings = settings.with_ws_base(&websocket_base_from_api(&api))?,
            (None, None) => {}
        }
        Ok(settings)
    }

    pub fn with_ws_base(mut self, raw: &str) -> Result<Self, SettingsError> {
        self.ws_base = parse_base(raw, &["ws", "wss"])?;
        Ok(self)
    }

    pub fn with_api_base(mut self, raw: &str) -> Result<Self, SettingsError> {
        self.api_base = parse_base(raw, &["http", "https"])?;
        Ok(self)
    }

    /// Websocket endpoint of one task: `{ws_base}/ws/{task_id}`.
    pub fn task_url(&self, task_id: &TaskId) -> Result<Url, SettingsError> {
        join_segments(&self.ws_base, &["ws", task_id.as_str()])
    }

    /// Endpoint under the api base. An empty last segment keeps a trailing slash.
    pub fn api_url(&self, segments: &[&str]) -> Result<Url, SettingsError> {
        join_segments(&self.api_base, segments)
    }
}

fn parse_base(raw: &str, expected: &'static [&'static str]) -> Result<Url, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| SettingsError::InvalidUrl {
        value: raw.to_string(),
        source,
    })?;
    if !expected.contains(&url.scheme()) {
        return Err(SettingsError::UnsupportedScheme {
            value: raw.to_string(),
            expected,
        });
    }
    if url.cannot_be_a_base() {
        return Err(SettingsError::NotABase(raw.to_string()));
    }
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, SettingsError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SettingsError::NotABase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn websocket_base_from_api(api: &str) -> String {
    let api = api.trim();
    match api.get(..4) {
        Some(scheme) if scheme.eq_ignore_ascii_case("http") => format!("ws{}", &api[4..]),
        _ => api.to_string(),
    }
}
