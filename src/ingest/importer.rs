//! Periodic import of weather observations into the snapshot store

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::DeliveryFeeError;
use crate::fee::SnapshotStore;

use super::observations::parse_observations;

/// Outcome of one import cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub observed_at: DateTime<Utc>,
    pub stored: usize,
    pub skipped: usize,
}

/// Fetches the observations feed and records the configured stations
pub struct WeatherImporter {
    client: ClientWithMiddleware,
    feed_url: String,
    stations: Vec<String>,
    retention: Option<chrono::Duration>,
    store: Arc<SnapshotStore>,
}

impl WeatherImporter {
    pub fn new(config: &WeatherConfig, store: Arc<SnapshotStore>) -> Result<Self, DeliveryFeeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("delivery-fee/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeliveryFeeError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            feed_url: config.feed_url.clone(),
            stations: config.stations.clone(),
            retention: (config.retention_hours > 0)
                .then(|| chrono::Duration::hours(config.retention_hours.into())),
            store,
        })
    }

    /// Fetch the feed once and store the observations
    #[instrument(name = "import_observations", skip(self), fields(url = %self.feed_url))]
    pub async fn import_once(&self) -> Result<ImportSummary, DeliveryFeeError> {
        let xml = self.fetch().await?;
        self.ingest(&xml, Utc::now())
    }

    /// Store the configured stations from a feed document
    pub fn ingest(
        &self,
        xml: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<ImportSummary, DeliveryFeeError> {
        let observations = parse_observations(xml, fetched_at)?;

        let (wanted, unwanted): (Vec<_>, Vec<_>) = observations
            .snapshots
            .into_iter()
            .partition(|s| self.stations.iter().any(|name| name == &s.station));

        for missing in self
            .stations
            .iter()
            .filter(|name| !wanted.iter().any(|s| &s.station == *name))
        {
            warn!("Station {} is missing from the observations feed", missing);
        }

        let stored = self.store.record_all(wanted);
        debug!(stored, skipped = unwanted.len(), "Recorded observations");

        if let Some(retention) = self.retention {
            let pruned = self.store.prune_before(observations.observed_at - retention);
            if pruned > 0 {
                debug!(pruned, "Dropped observations past the retention window");
            }
        }

        Ok(ImportSummary {
            observed_at: observations.observed_at,
            stored,
            skipped: unwanted.len(),
        })
    }

    async fn fetch(&self) -> Result<String, DeliveryFeeError> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| DeliveryFeeError::import(format!("Request failed: {e}")))?
            .error_for_status()
            .map_err(|e| DeliveryFeeError::import(format!("HTTP error: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| DeliveryFeeError::import(format!("Failed to read response body: {e}")))
    }

    /// Import every hour at `minute` past the hour, forever.
    ///
    /// Failed imports are logged and retried at the next slot.
    pub async fn run(self, minute: u32, import_on_startup: bool) {
        if import_on_startup {
            self.import_and_log().await;
        }

        loop {
            let now = Utc::now();
            let next = next_import_at(now, minute);
            debug!("Next weather import at {}", next);
            tokio::time::sleep((next - now).to_std().unwrap_or(Duration::ZERO)).await;
            self.import_and_log().await;
        }
    }

    async fn import_and_log(&self) {
        match self.import_once().await {
            Ok(summary) => info!(
                "Imported {} observations dated {} ({} other stations skipped)",
                summary.stored, summary.observed_at, summary.skipped
            ),
            Err(e) => warn!("Weather import failed: {}", e),
        }
    }
}

/// First instant strictly after `now` that falls on `minute` past an hour
#[must_use]
pub fn next_import_at(now: DateTime<Utc>, minute: u32) -> DateTime<Utc> {
    let slot = now
        .date_naive()
        .and_hms_opt(now.hour(), minute.min(59), 0)
        .map(|t| t.and_utc())
        .unwrap_or(now);

    if slot > now {
        slot
    } else {
        slot + chrono::Duration::hours(1)
    }
}
