use std::time::Duration;

use shared::domain::DEFAULT_LOCATION;
use storage::DEFAULT_DATABASE_URL;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub database_url: String,
    pub location: String,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            database_url: DEFAULT_DATABASE_URL.into(),
            location: DEFAULT_LOCATION.into(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ClientSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = non_blank("AIRGUARD_API_URL") {
            settings.api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_blank("AIRGUARD_DATABASE_URL") {
            settings.database_url = v;
        }
        if let Some(v) = non_blank("AIRGUARD_LOCATION") {
            settings.location = v;
        }
        if let Some(secs) =
            non_blank("AIRGUARD_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok())
        {
            settings.request_timeout = Duration::from_secs(secs.max(1));
        }
        settings
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
