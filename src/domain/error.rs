use serde::Serialize;
use thiserror::Error;

use crate::domain::parameters::{MAX_ATZ_PHASE_LENGTH_YEARS, MAX_HORIZON_YEARS};

/// Invalid simulation input. Raised before any simulated year runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("horizon must be between 1 and {max} years, got {0}", max = MAX_HORIZON_YEARS)]
    InvalidHorizon(u32),
    #[error("monte carlo trial count must be greater than zero")]
    InvalidTrialCount,
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: String, value: f64 },
    #[error("percentile must be within [0, 100], got {0}")]
    InvalidPercentile(f64),
    #[error("retirement age {0} is not covered by any cohort band")]
    RetirementAgeOutsideCohorts(f64),
    #[error("early retirement age {early} must be below retirement age {retirement}")]
    InvalidEarlyRetirementAge { early: f64, retirement: f64 },
    #[error(
        "atz phase length must be between 1 and {max} years, got {0}",
        max = MAX_ATZ_PHASE_LENGTH_YEARS
    )]
    InvalidAtzPhaseLength(u32),
    #[error("atz eligible cohort {0} is not a configured cohort band")]
    UnknownAtzCohort(String),
    #[error("attrition rate configured for unknown cohort {0}")]
    UnknownAttritionCohort(String),
    #[error("time to fill must be between 0 and 12 months, got {0}")]
    InvalidTimeToFill(u32),
    #[error("invalid entry age distribution: {0}")]
    InvalidEntryAgeDistribution(String),
    #[error("cohort label must not be empty")]
    EmptyCohortLabel,
    #[error("cohort label Unclassified is reserved")]
    ReservedCohortLabel,
    #[error("duplicate cohort label {0}")]
    DuplicateCohortLabel(String),
    #[error("cohort band {label} has lower bound {lower} above upper bound {upper}")]
    InvertedCohortBand { label: String, lower: f64, upper: f64 },
    #[error("cohort bands {first} and {second} overlap")]
    OverlappingCohortBands { first: String, second: String },
}

/// A year whose driver waterfall does not add up. Always a rule-ordering
/// defect; never corrected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "waterfall for scenario {scenario} year {year} does not reconcile: \
     {start} + {hires} - {retirements} - {attritions} - {atz_exits} != {end}"
)]
pub struct ReconciliationError {
    pub scenario: String,
    pub year: u32,
    pub start: f64,
    pub hires: f64,
    pub retirements: f64,
    pub attritions: f64,
    pub atz_exits: f64,
    pub end: f64,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),
}

/// An entity whose age falls outside every cohort band. Recorded, never
/// raised: the entity stays in totals and is left out of cohort groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityWarning {
    pub year: u32,
    pub entity_id: String,
    pub age: f64,
}
