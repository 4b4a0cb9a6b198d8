use std::sync::Arc;

use chrono::Utc;
use shared::domain::AqiReading;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::source::AqiSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
}

/// Whether the reading on display came from the AQI source or was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    Fallback,
}

/// Read-only view of the selected location and its latest reading.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub location: String,
    pub reading: Option<AqiReading>,
    pub status: LoadStatus,
    pub origin: Option<DataOrigin>,
    /// Bumped for every fetch cycle and every adopted reading. Completions
    /// carrying an older value are discarded.
    pub generation: u64,
    pub refresh_count: u64,
}

impl LocationSnapshot {
    fn initial(location: String) -> Self {
        Self {
            location,
            reading: None,
            status: LoadStatus::Loading,
            origin: None,
            generation: 0,
            refresh_count: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    SetLocation(String),
    Refresh,
}

pub struct LocationStore {
    source: Arc<dyn AqiSource>,
    state: watch::Sender<LocationSnapshot>,
}

impl LocationStore {
    pub fn new(source: Arc<dyn AqiSource>, initial_location: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LocationSnapshot::initial(initial_location.into()));
        Self { source, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        self.state.borrow().clone()
    }

    /// Runs the first fetch cycle for the initial location.
    pub async fn load(&self) {
        let (location, generation) = self.begin_cycle(|_| {});
        self.run_cycle(location, generation).await;
    }

    pub async fn apply(&self, command: StoreCommand) -> bool {
        match command {
            StoreCommand::SetLocation(name) => self.set_location(&name).await,
            StoreCommand::Refresh => {
                self.refresh_data().await;
                true
            }
        }
    }

    /// Switches to `name` and fetches it. Returns `false` without fetching when
    /// the trimmed name is empty or equal to the current location.
    pub async fn set_location(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let mut started = None;
        self.state.send_if_modified(|state| {
            if state.location == name {
                return false;
            }
            state.location = name.to_string();
            state.generation += 1;
            state.status = LoadStatus::Loading;
            started = Some(state.generation);
            true
        });
        let Some(generation) = started else {
            debug!(location = %name, "location unchanged");
            return false;
        };
        self.run_cycle(name.to_string(), generation).await;
        true
    }

    pub async fn refresh_data(&self) {
        let (location, generation) = self.begin_cycle(|state| state.refresh_count += 1);
        self.run_cycle(location, generation).await;
    }

    /// Replaces the current location and reading with one fetched elsewhere,
    /// for instance by the dispatcher answering a question about another city.
    /// Any cycle still in flight is superseded.
    pub fn adopt_reading(&self, reading: AqiReading) {
        self.state.send_modify(|state| {
            state.generation += 1;
            state.location = reading.location.clone();
            state.reading = Some(reading);
            state.origin = Some(DataOrigin::Live);
            state.status = LoadStatus::Ready;
        });
    }

    fn begin_cycle(&self, prepare: impl FnOnce(&mut LocationSnapshot)) -> (String, u64) {
        let mut started = (String::new(), 0);
        self.state.send_modify(|state| {
            prepare(state);
            state.generation += 1;
            state.status = LoadStatus::Loading;
            started = (state.location.clone(), state.generation);
        });
        started
    }

    async fn run_cycle(&self, location: String, generation: u64) {
        let (reading, origin) = match self.source.current(&location).await {
            Ok(Some(reading)) => (reading, DataOrigin::Live),
            Ok(None) => {
                warn!(%location, "no reading for location, using fallback");
                (AqiReading::fallback(&location, Utc::now()), DataOrigin::Fallback)
            }
            Err(err) => {
                warn!(%location, error = %err, "AQI fetch failed, using fallback");
                (AqiReading::fallback(&location, Utc::now()), DataOrigin::Fallback)
            }
        };

        self.state.send_if_modified(|state| {
            if state.generation != generation {
                debug!(
                    %location,
                    generation,
                    newest = state.generation,
                    "discarding stale AQI response"
                );
                return false;
            }
            if origin == DataOrigin::Live {
                info!(%location, aqi = reading.aqi, generation, "AQI reading updated");
            }
            if reading.location != state.location {
                debug!(
                    requested = %state.location,
                    canonical = %reading.location,
                    "adopting canonical location name"
                );
                state.location = reading.location.clone();
            }
            state.reading = Some(reading);
            state.origin = Some(origin);
            state.status = LoadStatus::Ready;
            true
        });
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
