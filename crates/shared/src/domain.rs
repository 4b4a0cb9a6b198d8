use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub $inner);
    };
}

id_newtype!(TurnId, Uuid);
id_newtype!(RedemptionId, i64);

pub const DEFAULT_LOCATION: &str = "Delhi";

/// Share of each pollution source, in percent. Each share lies in `[0, 100]`;
/// the shares are independent and need not add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceShares {
    pub traffic: f64,
    pub industry: f64,
    pub stubble: f64,
    pub construction: f64,
}

impl SourceShares {
    pub const fn new(traffic: f64, industry: f64, stubble: f64, construction: f64) -> Self {
        Self {
            traffic,
            industry,
            stubble,
            construction,
        }
    }

    /// Split used when the upstream feed is unavailable.
    pub const FALLBACK: Self = Self::new(35.0, 28.0, 22.0, 15.0);

    fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("traffic", self.traffic),
            ("industry", self.industry),
            ("stubble", self.stubble),
            ("construction", self.construction),
        ]
    }
}

impl Default for SourceShares {
    fn default() -> Self {
        Self::new(30.0, 30.0, 10.0, 30.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiReading {
    pub location: String,
    pub aqi: u32,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub sources: SourceShares,
    /// ISO-8601. A timestamp without an offset is read as UTC.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {raw}"))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamped) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamped.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    #[error("pollutant {field} must be a non-negative finite number, got {value}")]
    InvalidPollutant { field: &'static str, value: f64 },
    #[error("source share {field} must lie in [0, 100], got {value}")]
    InvalidShare { field: &'static str, value: f64 },
    #[error("reading has an empty location name")]
    EmptyLocation,
}

impl AqiReading {
    /// Reading substituted when the AQI source cannot be reached.
    pub fn fallback(location: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            location: location.into(),
            aqi: 342,
            pm25: 156.8,
            pm10: 289.4,
            no2: 78.2,
            so2: 34.5,
            co: 2.8,
            sources: SourceShares::FALLBACK,
            timestamp: now,
        }
    }

    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_aqi(self.aqi)
    }

    pub fn validate(&self) -> Result<(), ReadingError> {
        if self.location.trim().is_empty() {
            return Err(ReadingError::EmptyLocation);
        }
        let pollutants = [
            ("pm25", self.pm25),
            ("pm10", self.pm10),
            ("no2", self.no2),
            ("so2", self.so2),
            ("co", self.co),
        ];
        for (field, value) in pollutants {
            if !value.is_finite() || value < 0.0 {
                return Err(ReadingError::InvalidPollutant { field, value });
            }
        }
        for (field, value) in self.sources.entries() {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ReadingError::InvalidShare { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitive,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Good => "Air quality is satisfactory",
            Self::Moderate => "Acceptable air quality",
            Self::UnhealthyForSensitive => "Sensitive groups may experience health effects",
            Self::Unhealthy => "Everyone may begin to experience health effects",
            Self::VeryUnhealthy => "Health alert: everyone may experience serious effects",
            Self::Hazardous => "Health warning of emergency conditions",
        }
    }

    /// Inclusive bounds of the band. `None` as upper bound means unbounded.
    pub fn range(self) -> (u32, Option<u32>) {
        match self {
            Self::Good => (0, Some(50)),
            Self::Moderate => (51, Some(100)),
            Self::UnhealthyForSensitive => (101, Some(150)),
            Self::Unhealthy => (151, Some(200)),
            Self::VeryUnhealthy => (201, Some(300)),
            Self::Hazardous => (301, None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: TurnId(Uuid::new_v4()),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub is_asthmatic: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "User".into(),
            is_asthmatic: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Walk,
    Cycle,
    Bus,
}

impl Activity {
    pub fn reward(self) -> u64 {
        match self {
            Self::Walk => 50,
            Self::Cycle => 100,
            Self::Bus => 30,
        }
    }
}

impl std::str::FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(Self::Walk),
            "cycle" | "bike" => Ok(Self::Cycle),
            "bus" => Ok(Self::Bus),
            other => Err(format!("unknown activity '{other}'")),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
