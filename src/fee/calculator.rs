//! Fee calculation: base fee plus weather surcharges

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::models::{City, VehicleType, WeatherField};

use super::base_fee::BaseFeeTable;
use super::provider::SnapshotProvider;
use super::surcharge::{AppliedSurcharge, SurchargeEvaluator};
use super::{FeeError, Result};

/// Itemised result of a successful calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub city: City,
    pub vehicle_type: VehicleType,
    pub station: String,
    pub observed_at: DateTime<Utc>,
    pub base_fee: f64,
    pub surcharge: f64,
    pub surcharges: Vec<AppliedSurcharge>,
    pub total: f64,
    /// Measurements the station did not report; their rules were skipped
    pub missing_fields: Vec<WeatherField>,
}

/// Stateless calculator; every call reads the provider afresh
#[derive(Debug)]
pub struct FeeCalculator<P> {
    base_fees: BaseFeeTable,
    evaluator: SurchargeEvaluator,
    provider: P,
}

impl<P: SnapshotProvider> FeeCalculator<P> {
    pub fn new(base_fees: BaseFeeTable, evaluator: SurchargeEvaluator, provider: P) -> Self {
        Self {
            base_fees,
            evaluator,
            provider,
        }
    }

    /// Calculator with the stock fee table and rules
    pub fn with_defaults(provider: P) -> Self {
        Self::new(BaseFeeTable::default(), SurchargeEvaluator::default(), provider)
    }

    /// Total delivery fee for the weather at `at`
    pub fn calculate(&self, city: &str, vehicle_type: &str, at: DateTime<Utc>) -> Result<f64> {
        self.breakdown(city, vehicle_type, at).map(|b| b.total)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn breakdown(
        &self,
        city: &str,
        vehicle_type: &str,
        at: DateTime<Utc>,
    ) -> Result<FeeBreakdown> {
        let (parsed_city, vehicle, base_fee) = self.base_fees.resolve(city, vehicle_type)?;
        let station = parsed_city.station();

        let snapshot = self
            .provider
            .latest_snapshot(station, at)
            .ok_or_else(|| FeeError::WeatherDataUnavailable {
                station: station.to_string(),
                at,
            })?;

        let assessment = self.evaluator.evaluate(&snapshot, vehicle)?;

        for field in &assessment.missing_fields {
            warn!(
                "Station {} has not reported {}, calculated fee may not reflect weather conditions",
                station, field
            );
        }

        let total = base_fee + assessment.amount;
        debug!(
            base_fee,
            surcharge = assessment.amount,
            total,
            "Calculated delivery fee"
        );

        Ok(FeeBreakdown {
            city: parsed_city,
            vehicle_type: vehicle,
            station: station.to_string(),
            observed_at: snapshot.observed_at,
            base_fee,
            surcharge: assessment.amount,
            surcharges: assessment.applied,
            total,
            missing_fields: assessment.missing_fields,
        })
    }
}
