use shared::domain::UserProfile;
use storage::Storage;
use tracing::info;

/// Above this AQI an asthmatic user gets the critical alert.
pub const ASTHMA_ALERT_AQI: u32 = 200;
pub const ASTHMA_ALERT_TEXT: &str =
    "AQI is dangerous. Use inhaler immediately if symptomatic. Stay indoors.";

/// Offsets applied to the current AQI for the next hours, starting with now.
const OUTLOOK_OFFSETS: [(&str, i64); 6] = [
    ("Now", 0),
    ("1h", 10),
    ("2h", 25),
    ("3h", 15),
    ("4h", -5),
    ("5h", -20),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryGroup {
    pub title: &'static str,
    pub items: [&'static str; 3],
}

pub fn advisory_groups() -> [AdvisoryGroup; 3] {
    [
        AdvisoryGroup {
            title: "General Public",
            items: [
                "Limit outdoor activities, especially between 6 AM - 10 AM",
                "Wear N95/N99 masks when going outside",
                "Use air purifiers indoors if available",
            ],
        },
        AdvisoryGroup {
            title: "Sensitive Groups",
            items: [
                "Children, elderly, and pregnant women should avoid outdoor exposure",
                "People with respiratory conditions should stay indoors",
                "Keep emergency medicines readily available",
            ],
        },
        AdvisoryGroup {
            title: "Outdoor Workers",
            items: [
                "Mandatory N95 mask usage during work hours",
                "Take frequent breaks in filtered air environments",
                "Stay hydrated and watch for symptoms",
            ],
        },
    ]
}

pub fn asthma_alert(profile: &UserProfile, aqi: u32) -> bool {
    profile.is_asthmatic && aqi > ASTHMA_ALERT_AQI
}

/// Short-term outlook shown next to the current reading, floored at zero.
pub fn hourly_outlook(aqi: u32) -> Vec<(&'static str, u32)> {
    OUTLOOK_OFFSETS
        .iter()
        .map(|&(label, offset)| {
            let value = (i64::from(aqi) + offset).max(0);
            (label, u32::try_from(value).unwrap_or(u32::MAX))
        })
        .collect()
}

/// The user's profile, loaded from and written back to storage.
pub struct ProfileStore {
    storage: Storage,
    profile: UserProfile,
}

impl ProfileStore {
    pub async fn load(storage: Storage) -> anyhow::Result<Self> {
        let profile = storage.load_profile().await?.unwrap_or_default();
        Ok(Self { storage, profile })
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub async fn toggle_asthma(&mut self) -> anyhow::Result<bool> {
        let mut next = self.profile.clone();
        next.is_asthmatic = !next.is_asthmatic;
        self.storage.save_profile(&next).await?;
        self.profile = next;
        info!(is_asthmatic = self.profile.is_asthmatic, "asthma mode toggled");
        Ok(self.profile.is_asthmatic)
    }
}

#[cfg(test)]
#[path = "tests/advisory_tests.rs"]
mod tests;
