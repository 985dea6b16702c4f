use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::entity::{ContractState, Entity};
use crate::domain::error::DataQualityWarning;
use crate::services::simulation_types::{GroupMetrics, YearMetrics, YearlyState};

/// Groups one year-end population into totals, cohort and org-unit metrics.
///
/// Exited records contribute nothing. Staff in no cohort band count towards
/// `total`, `by_org_unit` and `unclassified`, never towards `by_cohort`.
pub fn aggregate(population: &[Arc<Entity>]) -> YearMetrics {
    let mut metrics = YearMetrics::default();
    for entity in population {
        if entity.state == ContractState::Vacant {
            metrics.open_positions += entity.weight;
            metrics.open_fte += entity.weight * entity.fte;
            continue;
        }
        if !entity.is_in_service() {
            continue;
        }

        metrics.total.add(entity);
        metrics
            .by_org_unit
            .entry(entity.org_unit.clone())
            .or_default()
            .add(entity);
        match entity.cohort.name() {
            Some(cohort) => metrics.by_cohort.entry(cohort.to_string()).or_default().add(entity),
            None => metrics.unclassified.add(entity),
        }
    }
    metrics
}

/// Staff whose age matches no cohort band in the given year.
pub fn unclassified_warnings(year: u32, population: &[Arc<Entity>]) -> Vec<DataQualityWarning> {
    population
        .iter()
        .filter(|entity| entity.is_in_service() && entity.cohort.is_unclassified())
        .map(|entity| DataQualityWarning {
            year,
            entity_id: entity.id.clone(),
            age: entity.age,
        })
        .collect()
}

/// One metric triple per year for a single group.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct SeriesValues {
    pub headcount: Vec<f64>,
    pub fte: Vec<f64>,
    pub cost: Vec<f64>,
}

impl SeriesValues {
    fn push(&mut self, metrics: &GroupMetrics) {
        self.headcount.push(metrics.headcount);
        self.fte.push(metrics.fte);
        self.cost.push(metrics.cost);
    }
}

/// Grouped time series handed to the presentation layer. Every group has
/// one value per entry of `years`; years in which a group is empty are 0.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    pub years: Vec<u32>,
    pub calendar_years: Vec<Option<i32>>,
    pub total: SeriesValues,
    pub by_cohort: BTreeMap<String, SeriesValues>,
    pub by_org_unit: BTreeMap<String, SeriesValues>,
    pub unclassified: SeriesValues,
    pub open_positions: Vec<f64>,
}

pub fn series(states: &[YearlyState]) -> ForecastSeries {
    let cohorts: BTreeSet<&String> = states
        .iter()
        .flat_map(|state| state.metrics.by_cohort.keys())
        .collect();
    let org_units: BTreeSet<&String> = states
        .iter()
        .flat_map(|state| state.metrics.by_org_unit.keys())
        .collect();

    let mut output = ForecastSeries::default();
    let empty = GroupMetrics::default();
    for state in states {
        let metrics = &state.metrics;
        output.years.push(state.year);
        output.calendar_years.push(state.calendar_year);
        output.total.push(&metrics.total);
        output.unclassified.push(&metrics.unclassified);
        output.open_positions.push(metrics.open_positions);
        for cohort in &cohorts {
            output
                .by_cohort
                .entry((*cohort).clone())
                .or_default()
                .push(metrics.by_cohort.get(*cohort).unwrap_or(&empty));
        }
        for org_unit in &org_units {
            output
                .by_org_unit
                .entry((*org_unit).clone())
                .or_default()
                .push(metrics.by_org_unit.get(*org_unit).unwrap_or(&empty));
        }
    }
    output
}
