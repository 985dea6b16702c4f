use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::entity::Entity;
use crate::domain::error::DataQualityWarning;
use crate::domain::parameters::SimulationParameters;
use crate::domain::waterfall::DriverWaterfall;

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupMetrics {
    pub headcount: f64,
    pub fte: f64,
    pub cost: f64,
}

impl GroupMetrics {
    pub fn add(&mut self, entity: &Entity) {
        self.headcount += entity.headcount();
        self.fte += entity.capacity();
        self.cost += entity.cost();
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Headcount => self.headcount,
            Metric::Fte => self.fte,
            Metric::Cost => self.cost,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Headcount,
    Fte,
    Cost,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Headcount, Metric::Fte, Metric::Cost];
}

/// Metrics of one year-end population.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct YearMetrics {
    pub total: GroupMetrics,
    pub by_cohort: BTreeMap<String, GroupMetrics>,
    pub by_org_unit: BTreeMap<String, GroupMetrics>,
    /// Staff whose age matches no cohort band. Included in `total`.
    pub unclassified: GroupMetrics,
    pub open_positions: f64,
    pub open_fte: f64,
}

/// Movements during one simulated year, in headcount units.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct YearFlows {
    pub start_headcount: f64,
    pub hires: f64,
    /// Mandatory and early retirements.
    pub retirements: f64,
    pub early_retirements: f64,
    pub attritions: f64,
    pub atz_exits: f64,
    pub atz_enrollments: f64,
    pub vacancy_fills: f64,
    /// Backfills decided this year that start next year.
    pub pending_hires: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct YearlyState {
    pub year: u32,
    pub calendar_year: Option<i32>,
    #[serde(skip)]
    pub population: Vec<Arc<Entity>>,
    pub metrics: YearMetrics,
    pub flows: YearFlows,
}

impl YearlyState {
    pub fn waterfall(&self) -> DriverWaterfall {
        DriverWaterfall {
            year: self.year,
            start_headcount: self.flows.start_headcount,
            hires: self.flows.hires,
            retirements: self.flows.retirements,
            attritions: self.flows.attritions,
            atz_exits: self.flows.atz_exits,
            end_headcount: self.metrics.total.headcount,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Band {
    pub mean: f64,
    pub percentiles: Vec<PercentileValue>,
}

impl Band {
    pub fn at(&self, percentile: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| (p.percentile - percentile).abs() < f64::EPSILON)
            .map(|p| p.value)
    }

    /// Distance between the lowest and highest requested percentile.
    pub fn width(&self) -> f64 {
        let values = self.percentiles.iter().map(|p| p.value);
        let low = values.clone().fold(f64::INFINITY, f64::min);
        let high = values.fold(f64::NEG_INFINITY, f64::max);
        if low.is_finite() && high.is_finite() { high - low } else { 0.0 }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct MetricBands {
    pub headcount: Band,
    pub fte: Band,
    pub cost: Band,
}

impl MetricBands {
    pub fn get(&self, metric: Metric) -> &Band {
        match metric {
            Metric::Headcount => &self.headcount,
            Metric::Fte => &self.fte,
            Metric::Cost => &self.cost,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut Band {
        match metric {
            Metric::Headcount => &mut self.headcount,
            Metric::Fte => &mut self.fte,
            Metric::Cost => &mut self.cost,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct YearBands {
    pub year: u32,
    pub calendar_year: Option<i32>,
    pub total: MetricBands,
    pub by_cohort: BTreeMap<String, MetricBands>,
    pub by_org_unit: BTreeMap<String, MetricBands>,
    pub unclassified: MetricBands,
    pub open_positions: Band,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonteCarloBands {
    pub trials: usize,
    pub seed: u64,
    pub percentiles: Vec<f64>,
    pub years: Vec<YearBands>,
}

/// Output of one named parameter set.
#[derive(Serialize, Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub cohort_version: u32,
    pub parameters: SimulationParameters,
    pub years: Vec<YearlyState>,
    pub monte_carlo: Option<MonteCarloBands>,
    pub warnings: Vec<DataQualityWarning>,
}

impl ScenarioResult {
    /// Waterfalls of the simulated years (year 0 is the snapshot).
    pub fn waterfalls(&self) -> Vec<DriverWaterfall> {
        self.years.iter().skip(1).map(YearlyState::waterfall).collect()
    }

    pub fn headcount_series(&self) -> Vec<f64> {
        self.years
            .iter()
            .map(|state| state.metrics.total.headcount)
            .collect()
    }
}
