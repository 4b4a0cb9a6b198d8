use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use server_api::feed::{DEFAULT_UPSTREAM_TOKEN, DEFAULT_UPSTREAM_URL};
use shared::domain::DEFAULT_LOCATION;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub upstream_url: String,
    pub upstream_token: String,
    pub upstream_timeout_secs: u64,
    pub default_location: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
            upstream_token: DEFAULT_UPSTREAM_TOKEN.into(),
            upstream_timeout_secs: 10,
            default_location: DEFAULT_LOCATION.into(),
        }
    }
}

impl Settings {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    upstream_url: Option<String>,
    upstream_token: Option<String>,
    upstream_timeout_secs: Option<u64>,
    default_location: Option<String>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new("server.toml"));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => apply_file_settings(settings, file_cfg),
        Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable settings file"),
    }
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.upstream_url {
        settings.upstream_url = v;
    }
    if let Some(v) = file_cfg.upstream_token {
        settings.upstream_token = v;
    }
    if let Some(v) = file_cfg.upstream_timeout_secs {
        settings.upstream_timeout_secs = v;
    }
    if let Some(v) = file_cfg.default_location {
        settings.default_location = v;
    }
}

/// Later keys in each list win, so the `APP__` form overrides the short form.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = lookup(key) {
            settings.server_bind = v;
        }
    }
    for key in ["AQI_UPSTREAM_URL", "APP__UPSTREAM_URL"] {
        if let Some(v) = lookup(key) {
            settings.upstream_url = v;
        }
    }
    for key in ["AQI_UPSTREAM_TOKEN", "APP__UPSTREAM_TOKEN"] {
        if let Some(v) = lookup(key) {
            settings.upstream_token = v;
        }
    }
    if let Some(v) = lookup("APP__UPSTREAM_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.upstream_timeout_secs = parsed;
        }
    }
    if let Some(v) = lookup("APP__DEFAULT_LOCATION") {
        if !v.trim().is_empty() {
            settings.default_location = v.trim().to_string();
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
