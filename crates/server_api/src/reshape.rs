use chrono::{DateTime, Utc};
use rand::Rng;
use shared::domain::{AqiReading, SourceShares};

use crate::feed::FeedData;

/// Upstream has no source apportionment, so shares are drawn at random on
/// every call.
pub fn random_source_shares<R: Rng + ?Sized>(rng: &mut R) -> SourceShares {
    SourceShares::new(
        f64::from(rng.gen_range(20u32..60)),
        f64::from(rng.gen_range(15u32..50)),
        f64::from(rng.gen_range(10u32..40)),
        f64::from(rng.gen_range(5u32..30)),
    )
}

/// Converts a successful feed payload into a reading. Missing pollutants
/// become 0 and a non-numeric AQI (the feed uses `"-"`) becomes 0. Values are
/// otherwise passed through unchecked.
pub fn reading_from_feed<R: Rng + ?Sized>(
    data: &FeedData,
    requested: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> AqiReading {
    let pollutant = |key: &str| {
        data.iaqi
            .get(key)
            .and_then(|m| m.v)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    };
    let location = data
        .city
        .as_ref()
        .and_then(|city| city.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(requested)
        .to_string();
    let timestamp = data
        .time
        .as_ref()
        .and_then(|time| time.iso.as_deref())
        .and_then(|iso| DateTime::parse_from_rfc3339(iso).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(now);

    AqiReading {
        location,
        aqi: numeric_aqi(&data.aqi),
        pm25: pollutant("pm25"),
        pm10: pollutant("pm10"),
        no2: pollutant("no2"),
        so2: pollutant("so2"),
        co: pollutant("co"),
        sources: random_source_shares(rng),
        timestamp,
    }
}

fn numeric_aqi(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v.round() as u64))
            .map(|v| v.min(u64::from(u32::MAX)) as u32)
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Entirely synthetic reading used when the upstream feed is unusable.
pub fn synthetic_reading<R: Rng + ?Sized>(
    location: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> AqiReading {
    AqiReading {
        location: location.to_string(),
        aqi: rng.gen_range(150..350),
        pm25: f64::from(rng.gen_range(50u32..200)),
        pm10: f64::from(rng.gen_range(100u32..300)),
        no2: f64::from(rng.gen_range(20u32..100)),
        so2: f64::from(rng.gen_range(10u32..60)),
        co: f64::from(rng.gen_range(1u32..6)),
        sources: SourceShares::FALLBACK,
        timestamp: now,
    }
}
