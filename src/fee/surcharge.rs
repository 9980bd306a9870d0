//! Weather surcharge rules
//!
//! Each rule inspects a [`WeatherSnapshot`] for a given vehicle and either
//! adds an amount, reports that it could not run because a measurement is
//! missing, or prohibits the ride outright. The [`SurchargeEvaluator`] runs
//! the rules in a fixed order; the first prohibition ends the evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{VehicleType, WeatherField, WeatherSnapshot};

use super::FeeError;

/// Limits and amounts used by the standard rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurchargeThresholds {
    /// Temperatures strictly below this are extreme cold (°C)
    pub extreme_cold_below: f64,
    pub extreme_cold_fee: f64,
    /// Temperatures at or below this (and not extreme) are freezing (°C)
    pub freezing_at_or_below: f64,
    pub freezing_fee: f64,
    /// Bike wind surcharge starts at this speed, inclusive (m/s)
    pub windy_from: f64,
    pub windy_fee: f64,
    /// Bike rides are forbidden above this speed (m/s)
    pub forbidden_wind_above: f64,
    pub snow_or_sleet_fee: f64,
    pub shower_fee: f64,
    pub rain_fee: f64,
}

impl Default for SurchargeThresholds {
    fn default() -> Self {
        Self {
            extreme_cold_below: -10.0,
            extreme_cold_fee: 1.0,
            freezing_at_or_below: 0.0,
            freezing_fee: 0.5,
            windy_from: 10.0,
            windy_fee: 0.5,
            forbidden_wind_above: 20.0,
            snow_or_sleet_fee: 1.0,
            shower_fee: 0.5,
            rain_fee: 0.5,
        }
    }
}

/// Result of a single rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule does not concern this vehicle
    NotApplicable,
    /// The rule applies but the station did not report what it needs
    Missing(WeatherField),
    /// Amount to add, possibly zero
    Surcharge(f64),
    /// The ride must not happen
    Forbidden(String),
}

/// A weather-based pricing rule
pub trait SurchargeRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn assess(&self, snapshot: &WeatherSnapshot, vehicle: VehicleType) -> RuleOutcome;
}

/// Cold weather surcharge for scooters and bikes
#[derive(Debug, Clone)]
pub struct TemperatureRule {
    extreme_cold_below: f64,
    extreme_cold_fee: f64,
    freezing_at_or_below: f64,
    freezing_fee: f64,
}

impl TemperatureRule {
    #[must_use]
    pub fn new(thresholds: &SurchargeThresholds) -> Self {
        Self {
            extreme_cold_below: thresholds.extreme_cold_below,
            extreme_cold_fee: thresholds.extreme_cold_fee,
            freezing_at_or_below: thresholds.freezing_at_or_below,
            freezing_fee: thresholds.freezing_fee,
        }
    }
}

impl SurchargeRule for TemperatureRule {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn assess(&self, snapshot: &WeatherSnapshot, vehicle: VehicleType) -> RuleOutcome {
        if !vehicle.is_open_air() {
            return RuleOutcome::NotApplicable;
        }
        match snapshot.air_temperature {
            None => RuleOutcome::Missing(WeatherField::AirTemperature),
            Some(t) if t < self.extreme_cold_below => RuleOutcome::Surcharge(self.extreme_cold_fee),
            Some(t) if t <= self.freezing_at_or_below => RuleOutcome::Surcharge(self.freezing_fee),
            Some(_) => RuleOutcome::Surcharge(0.0),
        }
    }
}

/// Coarse category of a free-text phenomenon label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhenomenonClass {
    Hazardous,
    SnowOrSleet,
    Shower,
    Rain,
    Other,
}

/// Classify a phenomenon label; the first matching category wins.
///
/// "Light snow shower" is snow, not a plain shower, because the snow check
/// runs first.
#[must_use]
pub fn classify_phenomenon(label: &str) -> PhenomenonClass {
    let label = label.to_lowercase();
    let has = |word: &str| label.contains(word);

    if has("glaze") || has("hail") || has("thunder") {
        PhenomenonClass::Hazardous
    } else if has("snow") || has("sleet") {
        PhenomenonClass::SnowOrSleet
    } else if has("shower") {
        PhenomenonClass::Shower
    } else if has("rain") {
        PhenomenonClass::Rain
    } else {
        PhenomenonClass::Other
    }
}

/// Precipitation surcharge and hazard prohibition for every vehicle
#[derive(Debug, Clone)]
pub struct PhenomenonRule {
    snow_or_sleet_fee: f64,
    shower_fee: f64,
    rain_fee: f64,
}

impl PhenomenonRule {
    #[must_use]
    pub fn new(thresholds: &SurchargeThresholds) -> Self {
        Self {
            snow_or_sleet_fee: thresholds.snow_or_sleet_fee,
            shower_fee: thresholds.shower_fee,
            rain_fee: thresholds.rain_fee,
        }
    }
}

impl SurchargeRule for PhenomenonRule {
    fn name(&self) -> &'static str {
        "phenomenon"
    }

    fn assess(&self, snapshot: &WeatherSnapshot, _vehicle: VehicleType) -> RuleOutcome {
        let Some(label) = snapshot
            .phenomenon
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        else {
            return RuleOutcome::Missing(WeatherField::Phenomenon);
        };

        match classify_phenomenon(label) {
            PhenomenonClass::Hazardous => {
                RuleOutcome::Forbidden(format!("hazardous weather phenomenon: {label}"))
            }
            PhenomenonClass::SnowOrSleet => RuleOutcome::Surcharge(self.snow_or_sleet_fee),
            PhenomenonClass::Shower => RuleOutcome::Surcharge(self.shower_fee),
            PhenomenonClass::Rain => RuleOutcome::Surcharge(self.rain_fee),
            PhenomenonClass::Other => RuleOutcome::Surcharge(0.0),
        }
    }
}

/// Wind surcharge and prohibition for bikes
#[derive(Debug, Clone)]
pub struct WindRule {
    windy_from: f64,
    windy_fee: f64,
    forbidden_above: f64,
}

impl WindRule {
    #[must_use]
    pub fn new(thresholds: &SurchargeThresholds) -> Self {
        Self {
            windy_from: thresholds.windy_from,
            windy_fee: thresholds.windy_fee,
            forbidden_above: thresholds.forbidden_wind_above,
        }
    }
}

impl SurchargeRule for WindRule {
    fn name(&self) -> &'static str {
        "wind"
    }

    fn assess(&self, snapshot: &WeatherSnapshot, vehicle: VehicleType) -> RuleOutcome {
        if vehicle != VehicleType::Bike {
            return RuleOutcome::NotApplicable;
        }
        match snapshot.wind_speed {
            None => RuleOutcome::Missing(WeatherField::WindSpeed),
            Some(w) if w > self.forbidden_above => RuleOutcome::Forbidden(format!(
                "wind speed {w:.1} m/s exceeds {:.1} m/s",
                self.forbidden_above
            )),
            Some(w) if w >= self.windy_from => RuleOutcome::Surcharge(self.windy_fee),
            Some(_) => RuleOutcome::Surcharge(0.0),
        }
    }
}

/// A rule that added a non-zero amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedSurcharge {
    pub rule: &'static str,
    pub amount: f64,
}

/// Outcome of a full, non-prohibited evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurchargeAssessment {
    pub amount: f64,
    pub applied: Vec<AppliedSurcharge>,
    pub missing_fields: Vec<WeatherField>,
}

/// A rule blocked the ride
#[derive(Debug, Clone, PartialEq)]
pub struct Prohibition {
    pub rule: &'static str,
    pub reason: String,
}

impl From<Prohibition> for FeeError {
    fn from(p: Prohibition) -> Self {
        FeeError::VehicleUseForbidden {
            rule: p.rule,
            reason: p.reason,
        }
    }
}

/// Ordered list of surcharge rules
pub struct SurchargeEvaluator {
    rules: Vec<Box<dyn SurchargeRule>>,
}

impl SurchargeEvaluator {
    pub fn new(rules: Vec<Box<dyn SurchargeRule>>) -> Self {
        Self { rules }
    }

    /// Temperature, then phenomenon, then wind
    #[must_use]
    pub fn standard(thresholds: &SurchargeThresholds) -> Self {
        Self::new(vec![
            Box::new(TemperatureRule::new(thresholds)),
            Box::new(PhenomenonRule::new(thresholds)),
            Box::new(WindRule::new(thresholds)),
        ])
    }

    /// Append a rule after the existing ones
    #[must_use]
    pub fn with_rule(mut self, rule: impl SurchargeRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Run every rule in order.
    ///
    /// Amounts accumulated before a prohibition are discarded.
    pub fn evaluate(
        &self,
        snapshot: &WeatherSnapshot,
        vehicle: VehicleType,
    ) -> Result<SurchargeAssessment, Prohibition> {
        let mut assessment = SurchargeAssessment::default();

        for rule in &self.rules {
            match rule.assess(snapshot, vehicle) {
                RuleOutcome::NotApplicable => {}
                RuleOutcome::Missing(field) => assessment.missing_fields.push(field),
                RuleOutcome::Surcharge(amount) => {
                    if amount != 0.0 {
                        assessment.amount += amount;
                        assessment.applied.push(AppliedSurcharge {
                            rule: rule.name(),
                            amount,
                        });
                    }
                }
                RuleOutcome::Forbidden(reason) => {
                    return Err(Prohibition {
                        rule: rule.name(),
                        reason,
                    });
                }
            }
        }

        Ok(assessment)
    }
}

impl Default for SurchargeEvaluator {
    fn default() -> Self {
        Self::standard(&SurchargeThresholds::default())
    }
}

impl fmt::Debug for SurchargeEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rule_names()).finish()
    }
}
