//! Delivery fee engine
//!
//! Combines the base fee table, the latest weather snapshot of the city's
//! station and the surcharge rules into a single fee.

pub mod base_fee;
pub mod calculator;
pub mod error;
pub mod provider;
pub mod surcharge;

pub use base_fee::BaseFeeTable;
pub use calculator::{FeeBreakdown, FeeCalculator};
pub use error::{FeeError, Result};
pub use provider::{SnapshotProvider, SnapshotStore};
pub use surcharge::{
    AppliedSurcharge, PhenomenonClass, PhenomenonRule, Prohibition, RuleOutcome,
    SurchargeAssessment, SurchargeEvaluator, SurchargeRule, SurchargeThresholds,
    TemperatureRule, WindRule, classify_phenomenon,
};
