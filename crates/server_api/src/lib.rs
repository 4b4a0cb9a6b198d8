use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use shared::{
    domain::AqiReading,
    error::{ApiException, ErrorCode},
    protocol::LocationQuery,
};
use tracing::{info, warn};

pub mod feed;
pub mod reshape;

use feed::{FeedData, UpstreamFeed};
use reshape::{reading_from_feed, synthetic_reading};

#[derive(Clone)]
pub struct ApiContext {
    pub feed: Arc<dyn UpstreamFeed>,
    pub default_location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOrigin {
    Upstream,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct ResolvedReading {
    pub reading: AqiReading,
    pub origin: ReadingOrigin,
}

/// Fetches `location` from the upstream feed and reshapes it. Any upstream
/// failure (transport, non-ok status, `status != "ok"`, undecodable payload,
/// a reading that fails validation) yields a synthetic reading instead of an
/// error. Only a synthetic reading that is itself invalid is an error.
pub async fn current_reading<R: Rng + Send + ?Sized>(
    ctx: &ApiContext,
    location: &str,
    rng: &mut R,
) -> Result<ResolvedReading, ApiException> {
    info!(%location, "fetching AQI data");
    let outcome = ctx.feed.fetch(location).await;
    let now = Utc::now();

    let upstream = match outcome {
        Ok(envelope) if envelope.is_ok() => {
            match serde_json::from_value::<FeedData>(envelope.data) {
                Ok(data) => Some(data),
                Err(error) => {
                    warn!(%location, %error, "upstream payload did not decode");
                    None
                }
            }
        }
        Ok(envelope) => {
            warn!(%location, status = %envelope.status, "upstream reported an error status");
            None
        }
        Err(error) => {
            warn!(%location, %error, "upstream fetch failed");
            None
        }
    };

    let upstream = upstream
        .map(|data| reading_from_feed(&data, location, now, rng))
        .filter(|reading| match reading.validate() {
            Ok(()) => true,
            Err(error) => {
                warn!(%location, %error, "upstream reading failed validation");
                false
            }
        });

    let resolved = match upstream {
        Some(reading) => ResolvedReading {
            reading,
            origin: ReadingOrigin::Upstream,
        },
        None => {
            info!(%location, "using fallback data");
            ResolvedReading {
                reading: synthetic_reading(location, now, rng),
                origin: ReadingOrigin::Synthetic,
            }
        }
    };

    resolved
        .reading
        .validate()
        .map_err(|e| ApiException::new(ErrorCode::Internal, e.to_string()))?;
    Ok(resolved)
}

pub fn requested_location<'a>(ctx: &'a ApiContext, query: &'a LocationQuery) -> &'a str {
    query.location_or(&ctx.default_location)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
