//! What-if projection of a day's AQI under emission controls.

use std::f64::consts::PI;

use shared::domain::{AqiReading, SourceShares};

const DEFAULT_BASE_AQI: f64 = 200.0;
const DIURNAL_AMPLITUDE: f64 = 0.1;

/// Percent of each source's normal activity still allowed, 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterventionControls {
    pub traffic: f64,
    pub industry: f64,
    pub stubble: f64,
}

impl Default for InterventionControls {
    fn default() -> Self {
        Self {
            traffic: 80.0,
            industry: 70.0,
            stubble: 40.0,
        }
    }
}

impl InterventionControls {
    pub fn new(traffic: f64, industry: f64, stubble: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 100.0) } else { 100.0 };
        Self {
            traffic: clamp(traffic),
            industry: clamp(industry),
            stubble: clamp(stubble),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyProjection {
    pub hour: u8,
    pub label: String,
    pub baseline: i64,
    pub predicted: i64,
}

/// 24 hourly points. Without a usable reading the projection starts from an
/// AQI of 200 with the default source split.
pub fn project_day(
    reading: Option<&AqiReading>,
    controls: &InterventionControls,
) -> Vec<HourlyProjection> {
    let (base, sources) = match reading {
        Some(r) if r.aqi > 0 => (f64::from(r.aqi), r.sources),
        _ => (DEFAULT_BASE_AQI, SourceShares::default()),
    };

    let reduction = |share: f64, control: f64| base * (share / 100.0) * (1.0 - control / 100.0);
    let total_reduction = reduction(sources.traffic, controls.traffic)
        + reduction(sources.industry, controls.industry)
        + reduction(sources.stubble, controls.stubble);

    (0..24u8)
        .map(|hour| {
            let variation =
                ((f64::from(hour) - 6.0) / 12.0 * PI).sin() * base * DIURNAL_AMPLITUDE;
            let baseline = base + variation;
            let predicted = (baseline - total_reduction).max(0.0);
            HourlyProjection {
                hour,
                label: format!("{hour}:00"),
                baseline: baseline.round() as i64,
                predicted: predicted.round() as i64,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/simulation_tests.rs"]
mod tests;
