use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::cohort::{CohortBands, CohortLabel};
use crate::domain::error::ConfigurationError;

pub const MAX_HORIZON_YEARS: u32 = 10;
/// Work plus release phase must fit inside a working life.
pub const MAX_ATZ_PHASE_LENGTH_YEARS: u32 = 10;

/// Age distribution that new hires are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryAgeDistribution {
    Fixed { age: f64 },
    Uniform { min: f64, max: f64 },
    /// Normal distribution clamped to `[min, max]`.
    Normal { mean: f64, std_dev: f64, min: f64, max: f64 },
    /// Beta-PERT three point distribution.
    Pert { min: f64, mode: f64, max: f64 },
}

impl EntryAgeDistribution {
    /// Expected entry age, used by the deterministic projection.
    pub fn mean(&self) -> f64 {
        match *self {
            EntryAgeDistribution::Fixed { age } => age,
            EntryAgeDistribution::Uniform { min, max } => (min + max) / 2.0,
            EntryAgeDistribution::Normal { mean, min, max, .. } => mean.clamp(min, max),
            EntryAgeDistribution::Pert { min, mode, max } => (min + 4.0 * mode + max) / 6.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidEntryAgeDistribution(reason.to_string());
        match *self {
            EntryAgeDistribution::Fixed { age } => {
                if !age.is_finite() || age < 0.0 {
                    return Err(invalid("fixed age must be a non-negative number"));
                }
            }
            EntryAgeDistribution::Uniform { min, max } => {
                if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
                    return Err(invalid("uniform bounds must satisfy 0 <= min <= max"));
                }
            }
            EntryAgeDistribution::Normal {
                mean,
                std_dev,
                min,
                max,
            } => {
                if !(mean.is_finite() && std_dev.is_finite()) || std_dev < 0.0 {
                    return Err(invalid("normal std_dev must be a non-negative number"));
                }
                if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
                    return Err(invalid("normal clamp bounds must satisfy 0 <= min <= max"));
                }
            }
            EntryAgeDistribution::Pert { min, mode, max } => {
                if !(min.is_finite() && mode.is_finite() && max.is_finite()) || min < 0.0 {
                    return Err(invalid("pert bounds must be non-negative numbers"));
                }
                if mode < min || mode > max {
                    return Err(invalid("pert mode must lie within [min, max]"));
                }
            }
        }
        Ok(())
    }
}

/// Immutable configuration of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    pub horizon_years: u32,
    pub retirement_age: f64,
    pub early_retirement_age: f64,
    pub early_retirement_rate: f64,
    /// Annual voluntary attrition per cohort label.
    pub attrition_rates: BTreeMap<String, f64>,
    /// Applied to cohorts without an entry in `attrition_rates`.
    pub default_attrition_rate: f64,
    /// Share of each year's exits that is backfilled.
    pub replacement_ratio: f64,
    pub time_to_fill_months: u32,
    pub vacancy_fill_rate: f64,
    pub atz_enrollment_rate: f64,
    pub atz_phase_length_years: u32,
    pub atz_min_age: f64,
    /// Empty means every cohort is eligible.
    pub atz_eligible_cohorts: Vec<String>,
    pub entry_age: EntryAgeDistribution,
    pub seed: u64,
    pub trials: usize,
    pub percentiles: Vec<f64>,
    pub start_year: Option<i32>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            horizon_years: 5,
            retirement_age: 67.0,
            early_retirement_age: 63.0,
            early_retirement_rate: 0.0,
            attrition_rates: BTreeMap::new(),
            default_attrition_rate: 0.05,
            replacement_ratio: 1.0,
            time_to_fill_months: 3,
            vacancy_fill_rate: 0.0,
            atz_enrollment_rate: 0.0,
            atz_phase_length_years: 3,
            atz_min_age: 55.0,
            atz_eligible_cohorts: Vec::new(),
            entry_age: EntryAgeDistribution::Pert {
                min: 20.0,
                mode: 28.0,
                max: 45.0,
            },
            seed: 42,
            trials: 1000,
            percentiles: vec![10.0, 90.0],
            start_year: None,
        }
    }
}

impl SimulationParameters {
    /// Checks every invariant against the band set the run will use.
    ///
    /// # Errors
    /// Returns the first [`ConfigurationError`] found.
    pub fn validate(&self, bands: &CohortBands) -> Result<(), ConfigurationError> {
        if !(1..=MAX_HORIZON_YEARS).contains(&self.horizon_years) {
            return Err(ConfigurationError::InvalidHorizon(self.horizon_years));
        }
        if self.trials == 0 {
            return Err(ConfigurationError::InvalidTrialCount);
        }

        check_rate("early_retirement_rate", self.early_retirement_rate)?;
        check_rate("default_attrition_rate", self.default_attrition_rate)?;
        check_rate("replacement_ratio", self.replacement_ratio)?;
        check_rate("vacancy_fill_rate", self.vacancy_fill_rate)?;
        check_rate("atz_enrollment_rate", self.atz_enrollment_rate)?;
        for (cohort, rate) in &self.attrition_rates {
            if !bands.contains_label(cohort) {
                return Err(ConfigurationError::UnknownAttritionCohort(cohort.clone()));
            }
            check_rate(&format!("attrition rate for {cohort}"), *rate)?;
        }

        for percentile in &self.percentiles {
            if !(0.0..=100.0).contains(percentile) {
                return Err(ConfigurationError::InvalidPercentile(*percentile));
            }
        }

        if !self.retirement_age.is_finite() || bands.classify(self.retirement_age).is_unclassified() {
            return Err(ConfigurationError::RetirementAgeOutsideCohorts(self.retirement_age));
        }
        if self.early_retirement_rate > 0.0 && self.early_retirement_age >= self.retirement_age {
            return Err(ConfigurationError::InvalidEarlyRetirementAge {
                early: self.early_retirement_age,
                retirement: self.retirement_age,
            });
        }

        if !(1..=MAX_ATZ_PHASE_LENGTH_YEARS).contains(&self.atz_phase_length_years) {
            return Err(ConfigurationError::InvalidAtzPhaseLength(
                self.atz_phase_length_years,
            ));
        }
        if let Some(unknown) = self
            .atz_eligible_cohorts
            .iter()
            .find(|cohort| !bands.contains_label(cohort))
        {
            return Err(ConfigurationError::UnknownAtzCohort(unknown.clone()));
        }

        if self.time_to_fill_months > 12 {
            return Err(ConfigurationError::InvalidTimeToFill(self.time_to_fill_months));
        }

        self.entry_age.validate()
    }

    /// Attrition rate for a cohort. Unclassified entities have none.
    pub fn attrition_rate(&self, cohort: &CohortLabel) -> f64 {
        match cohort.name() {
            Some(name) => self
                .attrition_rates
                .get(name)
                .copied()
                .unwrap_or(self.default_attrition_rate),
            None => 0.0,
        }
    }

    /// Share of a year's backfills that only starts in the following year.
    pub fn pending_hire_share(&self) -> f64 {
        f64::from(self.time_to_fill_months) / 12.0
    }

    pub fn is_atz_eligible_cohort(&self, cohort: &CohortLabel) -> bool {
        if self.atz_eligible_cohorts.is_empty() {
            return true;
        }
        cohort
            .name()
            .is_some_and(|name| self.atz_eligible_cohorts.iter().any(|c| c == name))
    }
}

fn check_rate(name: &str, value: f64) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::RateOutOfRange {
            name: name.to_string(),
            value,
        })
    }
}
