use log::info;
use thiserror::Error;

use crate::domain::cohort::CohortBands;
use crate::domain::entity::Entity;
use crate::domain::error::EngineError;
use crate::domain::parameters::SimulationParameters;
use crate::services::comparison::{Scenario, compare};
use crate::services::monte_carlo::sample;
use crate::services::projection::project;
use crate::services::report::{ComparisonReport, ForecastReport};
use crate::services::scenario_yaml::{ScenarioYamlError, load_scenario_from_yaml_file};
use crate::services::simulation_types::ScenarioResult;
use crate::services::snapshot_yaml::{SnapshotYamlError, load_snapshot_from_yaml_file};

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("failed to load snapshot: {0}")]
    Snapshot(#[from] SnapshotYamlError),
    #[error("failed to load scenario: {0}")]
    Scenario(#[from] ScenarioYamlError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Command-line values that take precedence over a scenario file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub start_year: Option<i32>,
    /// Used only when neither the command line nor the scenario names a
    /// start year.
    pub fallback_start_year: Option<i32>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub horizon_years: Option<u32>,
}

impl RunOverrides {
    fn apply(&self, mut scenario: Scenario) -> Scenario {
        let params = &mut scenario.parameters;
        params.start_year = self
            .start_year
            .or(params.start_year)
            .or(self.fallback_start_year);
        if let Some(trials) = self.trials {
            params.trials = trials;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(horizon_years) = self.horizon_years {
            params.horizon_years = horizon_years;
        }
        scenario
    }
}

/// Deterministic projection plus, when requested, Monte-Carlo bands for the
/// same parameters.
///
/// # Errors
/// See [`project`] and [`sample`].
pub fn run_scenario(
    name: &str,
    snapshot: &[Entity],
    bands: &CohortBands,
    params: &SimulationParameters,
    monte_carlo: bool,
) -> Result<ScenarioResult, EngineError> {
    let mut result = project(name, snapshot, bands, params)?;
    if monte_carlo {
        result.monte_carlo = Some(sample(name, snapshot, bands, params)?);
    }
    Ok(result)
}

pub fn forecast_from_files(
    snapshot_path: &str,
    scenario_path: Option<&str>,
    monte_carlo: bool,
    overrides: &RunOverrides,
) -> Result<ForecastReport, ForecastError> {
    let snapshot = load_snapshot_from_yaml_file(snapshot_path)?;
    let scenario = overrides.apply(load_scenario_if_provided(scenario_path, "baseline")?);
    info!(
        "loaded {} records from {snapshot_path} for scenario {}",
        snapshot.entities.len(),
        scenario.name
    );

    let result = run_scenario(
        &scenario.name,
        &snapshot.entities,
        &snapshot.bands,
        &scenario.parameters,
        monte_carlo,
    )?;
    Ok(ForecastReport::from_result(&data_source_name(snapshot_path), &result))
}

pub fn compare_from_files(
    snapshot_path: &str,
    scenario_a_path: &str,
    scenario_b_path: &str,
    monte_carlo: bool,
    overrides: &RunOverrides,
) -> Result<ComparisonReport, ForecastError> {
    let snapshot = load_snapshot_from_yaml_file(snapshot_path)?;
    let a = overrides.apply(load_scenario_from_yaml_file(scenario_a_path)?);
    let mut b = overrides.apply(load_scenario_from_yaml_file(scenario_b_path)?);
    if b.name == a.name {
        b.name = format!("{} (B)", b.name);
    }

    let comparison = compare(&snapshot.entities, &snapshot.bands, &a, &b, monte_carlo)?;
    Ok(ComparisonReport::from_comparison(
        &data_source_name(snapshot_path),
        &comparison,
    ))
}

fn load_scenario_if_provided(
    scenario_path: Option<&str>,
    default_name: &str,
) -> Result<Scenario, ScenarioYamlError> {
    if let Some(path) = scenario_path {
        load_scenario_from_yaml_file(path)
    } else {
        Ok(Scenario::new(default_name, SimulationParameters::default()))
    }
}

fn data_source_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}
