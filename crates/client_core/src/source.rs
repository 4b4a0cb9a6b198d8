use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::AqiReading,
    protocol::{first_reading, AqiFeed, AQI_CURRENT_ROUTE},
};
use tracing::debug;
use url::Url;

use crate::error::SourceError;

/// Where AQI readings come from. `Ok(None)` means the endpoint answered but
/// had no reading for the location.
#[async_trait]
pub trait AqiSource: Send + Sync {
    async fn current(&self, location: &str) -> Result<Option<AqiReading>, SourceError>;
}

pub struct HttpAqiSource {
    http: Client,
    base_url: String,
}

impl HttpAqiSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|_| SourceError::InvalidUrl(base_url.clone()))?;
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url,
        })
    }

    pub fn endpoint(&self, location: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}{AQI_CURRENT_ROUTE}", self.base_url))
            .map_err(|_| SourceError::InvalidUrl(self.base_url.clone()))?;
        url.query_pairs_mut().append_pair("location", location);
        Ok(url)
    }
}

#[async_trait]
impl AqiSource for HttpAqiSource {
    async fn current(&self, location: &str) -> Result<Option<AqiReading>, SourceError> {
        let url = self.endpoint(location)?;
        debug!(%url, "requesting AQI reading");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        let feed: AqiFeed = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let Some(reading) = first_reading(feed) else {
            return Ok(None);
        };
        reading
            .validate()
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(Some(reading))
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
