use serde::{Deserialize, Serialize};

use crate::domain::AqiReading;

pub const AQI_CURRENT_ROUTE: &str = "/api/aqi/current";
pub const AQI_EDGE_ROUTE: &str = "/aqi-data";
pub const HEALTH_ROUTE: &str = "/healthz";

/// Both AQI endpoints answer with an array whose first element is the reading.
pub type AqiFeed = Vec<AqiReading>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub location: Option<String>,
}

impl LocationQuery {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
        }
    }

    /// Requested location, or `default` when absent or blank.
    pub fn location_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(default)
    }
}

pub fn first_reading(feed: AqiFeed) -> Option<AqiReading> {
    feed.into_iter().next()
}
