use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.waqi.info";
pub const DEFAULT_UPSTREAM_TOKEN: &str = "demo";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid upstream url '{0}'")]
    InvalidUrl(String),
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream answered with status {0}")]
    Status(u16),
}

/// Raw envelope of the world-AQI feed. `data` is an object when `status` is
/// `"ok"` and an error string otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FeedEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status == "ok" && self.data.is_object()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedData {
    #[serde(default)]
    pub aqi: serde_json::Value,
    #[serde(default)]
    pub city: Option<FeedCity>,
    #[serde(default)]
    pub iaqi: HashMap<String, FeedMeasurement>,
    #[serde(default)]
    pub time: Option<FeedTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedCity {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedMeasurement {
    #[serde(default)]
    pub v: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedTime {
    #[serde(default)]
    pub iso: Option<String>,
}

#[async_trait]
pub trait UpstreamFeed: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<FeedEnvelope, FeedError>;
}

pub struct WaqiFeed {
    http: Client,
    base_url: String,
    token: String,
}

impl WaqiFeed {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|_| FeedError::InvalidUrl(base_url.clone()))?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// `{base}/feed/{location}/?token={token}` with the location as one
    /// percent-encoded path segment.
    pub fn feed_url(&self, location: &str) -> Result<Url, FeedError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|_| FeedError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| FeedError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("feed")
            .push(location)
            .push("");
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}

#[async_trait]
impl UpstreamFeed for WaqiFeed {
    async fn fetch(&self, location: &str) -> Result<FeedEnvelope, FeedError> {
        let response = self
            .http
            .get(self.feed_url(location)?)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}
