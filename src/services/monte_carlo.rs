use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::info;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::domain::cohort::CohortBands;
use crate::domain::entity::Entity;
use crate::domain::error::{EngineError, ReconciliationError};
use crate::domain::parameters::SimulationParameters;
use crate::services::draws::RandomDraws;
use crate::services::percentiles::percentiles_of;
use crate::services::projection::{prepare_population, simulate_years};
use crate::services::simulation_types::{
    Band, GroupMetrics, Metric, MetricBands, MonteCarloBands, PercentileValue, YearBands, YearMetrics,
};
use crate::services::trial_rng::trial_rng;

/// Year-end metrics of one trial, indexed by year offset.
type TrialMetrics = Vec<YearMetrics>;

/// Runs `params.trials` independent stochastic trials and reduces them to
/// per-year percentile bands.
///
/// # Errors
/// [`EngineError::Configuration`] for invalid parameters;
/// [`EngineError::Reconciliation`] if any trial's waterfall does not add up.
pub fn sample(
    name: &str,
    snapshot: &[Entity],
    bands: &CohortBands,
    params: &SimulationParameters,
) -> Result<MonteCarloBands, EngineError> {
    params.validate(bands)?;
    info!(
        "sampling scenario {name}: {} trials, seed {}, percentiles {:?}",
        params.trials, params.seed, params.percentiles
    );

    let initial = prepare_population(snapshot, bands, params);
    let trials = run_trials(name, &initial, params, bands)?;

    Ok(MonteCarloBands {
        trials: params.trials,
        seed: params.seed,
        percentiles: params.percentiles.clone(),
        years: summarize(&trials, params),
    })
}

fn run_trial(
    name: &str,
    initial: &[Arc<Entity>],
    params: &SimulationParameters,
    bands: &CohortBands,
    trial_index: usize,
) -> Result<TrialMetrics, ReconciliationError> {
    let mut draws = RandomDraws::new(trial_rng(params.seed, trial_index as u64));
    let years = simulate_years(initial.to_vec(), params, bands, &mut draws);
    for state in years.iter().skip(1) {
        state.waterfall().reconcile(name)?;
    }
    Ok(years.into_iter().map(|state| state.metrics).collect())
}

#[cfg(feature = "parallel")]
fn run_trials(
    name: &str,
    initial: &[Arc<Entity>],
    params: &SimulationParameters,
    bands: &CohortBands,
) -> Result<Vec<TrialMetrics>, ReconciliationError> {
    (0..params.trials)
        .into_par_iter()
        .map(|trial_index| run_trial(name, initial, params, bands, trial_index))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_trials(
    name: &str,
    initial: &[Arc<Entity>],
    params: &SimulationParameters,
    bands: &CohortBands,
) -> Result<Vec<TrialMetrics>, ReconciliationError> {
    (0..params.trials)
        .map(|trial_index| run_trial(name, initial, params, bands, trial_index))
        .collect()
}

fn summarize(trials: &[TrialMetrics], params: &SimulationParameters) -> Vec<YearBands> {
    (0..=params.horizon_years)
        .map(|year| {
            let index = year as usize;
            let year_metrics: Vec<&YearMetrics> =
                trials.iter().filter_map(|trial| trial.get(index)).collect();
            let cohorts: BTreeSet<&String> = year_metrics
                .iter()
                .flat_map(|metrics| metrics.by_cohort.keys())
                .collect();
            let org_units: BTreeSet<&String> = year_metrics
                .iter()
                .flat_map(|metrics| metrics.by_org_unit.keys())
                .collect();

            YearBands {
                year,
                calendar_year: params.start_year.map(|start| start + year as i32),
                total: metric_bands(&year_metrics, &params.percentiles, |metrics| {
                    Some(&metrics.total)
                }),
                by_cohort: grouped_bands(&year_metrics, &cohorts, &params.percentiles, |metrics| {
                    &metrics.by_cohort
                }),
                by_org_unit: grouped_bands(
                    &year_metrics,
                    &org_units,
                    &params.percentiles,
                    |metrics| &metrics.by_org_unit,
                ),
                unclassified: metric_bands(&year_metrics, &params.percentiles, |metrics| {
                    Some(&metrics.unclassified)
                }),
                open_positions: band(
                    year_metrics.iter().map(|metrics| metrics.open_positions).collect(),
                    &params.percentiles,
                ),
            }
        })
        .collect()
}

fn grouped_bands<F>(
    year_metrics: &[&YearMetrics],
    keys: &BTreeSet<&String>,
    percentiles: &[f64],
    groups: F,
) -> BTreeMap<String, MetricBands>
where
    F: Fn(&YearMetrics) -> &BTreeMap<String, GroupMetrics>,
{
    keys.iter()
        .map(|key| {
            let bands = metric_bands(year_metrics, percentiles, |metrics| {
                groups(metrics).get(key.as_str())
            });
            ((*key).clone(), bands)
        })
        .collect()
}

/// A group missing from a trial counts as zero in that trial.
fn metric_bands<F>(year_metrics: &[&YearMetrics], percentiles: &[f64], group: F) -> MetricBands
where
    F: Fn(&YearMetrics) -> Option<&GroupMetrics>,
{
    let mut bands = MetricBands::default();
    for metric in Metric::ALL {
        let values: Vec<f64> = year_metrics
            .iter()
            .map(|metrics| group(*metrics).map_or(0.0, |g| g.get(metric)))
            .collect();
        *bands.get_mut(metric) = band(values, percentiles);
    }
    bands
}

fn band(mut values: Vec<f64>, percentiles: &[f64]) -> Band {
    if values.is_empty() {
        return Band::default();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let extracted = percentiles_of(&mut values, percentiles);
    Band {
        mean,
        percentiles: percentiles
            .iter()
            .zip(extracted)
            .map(|(percentile, value)| PercentileValue {
                percentile: *percentile,
                value,
            })
            .collect(),
    }
}
