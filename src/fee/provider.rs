//! Source of weather snapshots for fee calculation

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::models::WeatherSnapshot;

/// Supplies the latest observation of a station at or before an instant.
///
/// `None` means the station has no observation that old, which is distinct
/// from an observation whose measurements are all absent.
pub trait SnapshotProvider: Send + Sync {
    fn latest_snapshot(&self, station: &str, at_or_before: DateTime<Utc>)
    -> Option<WeatherSnapshot>;
}

impl<P: SnapshotProvider + ?Sized> SnapshotProvider for std::sync::Arc<P> {
    fn latest_snapshot(
        &self,
        station: &str,
        at_or_before: DateTime<Utc>,
    ) -> Option<WeatherSnapshot> {
        (**self).latest_snapshot(station, at_or_before)
    }
}

/// In-process observation history, one time-ordered series per station.
///
/// History grows with every import until [`SnapshotStore::prune_before`]
/// trims it.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    series: RwLock<HashMap<String, BTreeMap<DateTime<Utc>, WeatherSnapshot>>>,
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an observation, replacing any earlier one for the same instant
    pub fn record(&self, snapshot: WeatherSnapshot) {
        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        series
            .entry(snapshot.station.clone())
            .or_default()
            .insert(snapshot.observed_at, snapshot);
    }

    pub fn record_all(&self, snapshots: impl IntoIterator<Item = WeatherSnapshot>) -> usize {
        snapshots
            .into_iter()
            .map(|snapshot| self.record(snapshot))
            .count()
    }

    /// Drop observations older than `cutoff`, keeping at least the newest
    /// one of every station. Returns how many were removed.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = 0;

        for history in series.values_mut() {
            let mut kept = history.split_off(&cutoff);
            if kept.is_empty() {
                if let Some((at, snapshot)) = history.pop_last() {
                    kept.insert(at, snapshot);
                }
            }
            removed += history.len();
            *history = kept;
        }

        removed
    }

    /// Total number of stored observations
    pub fn len(&self) -> usize {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        series.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stations with at least one observation, sorted by name
    pub fn stations(&self) -> Vec<String> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = series.keys().cloned().collect();
        names.sort();
        names
    }
}

impl SnapshotProvider for SnapshotStore {
    fn latest_snapshot(
        &self,
        station: &str,
        at_or_before: DateTime<Utc>,
    ) -> Option<WeatherSnapshot> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        series
            .get(station)?
            .range(..=at_or_before)
            .next_back()
            .map(|(_, snapshot)| snapshot.clone())
    }
}
