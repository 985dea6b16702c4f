use std::sync::Arc;

use log::{debug, info, warn};

use crate::domain::cohort::CohortBands;
use crate::domain::entity::{AtzTerm, ContractState, Entity};
use crate::domain::error::{DataQualityWarning, EngineError};
use crate::domain::parameters::SimulationParameters;
use crate::services::aggregation::{aggregate, unclassified_warnings};
use crate::services::draws::{ExpectedValueDraws, TransitionDraws};
use crate::services::simulation_types::{ScenarioResult, YearFlows, YearlyState};
use crate::services::transition::{PopulationState, advance_year};

/// Year-0 population: cohorts classified against `bands`, snapshot ATZ staff
/// without an explicit term given one that is already under way.
pub fn prepare_population(
    snapshot: &[Entity],
    bands: &CohortBands,
    params: &SimulationParameters,
) -> Vec<Arc<Entity>> {
    let phase_length = params.atz_phase_length_years as i32;
    snapshot
        .iter()
        .map(|entity| {
            let mut entity = entity.clone();
            entity.cohort = bands.classify(entity.age);
            if entity.atz.is_none() {
                entity.atz = match entity.state {
                    ContractState::AtzWorkPhase => {
                        Some(AtzTerm::starting(0, params.atz_phase_length_years))
                    }
                    ContractState::AtzReleasePhase => Some(AtzTerm {
                        start_year: -phase_length,
                        end_year: phase_length,
                    }),
                    _ => None,
                };
            }
            Arc::new(entity)
        })
        .collect()
}

/// Runs the yearly transitions for the whole horizon. Element 0 of the
/// result is the snapshot itself.
pub fn simulate_years<D: TransitionDraws>(
    initial: Vec<Arc<Entity>>,
    params: &SimulationParameters,
    bands: &CohortBands,
    draws: &mut D,
) -> Vec<YearlyState> {
    let metrics = aggregate(&initial);
    let mut years = Vec::with_capacity(params.horizon_years as usize + 1);
    years.push(YearlyState {
        year: 0,
        calendar_year: calendar_year(params, 0),
        flows: YearFlows {
            start_headcount: metrics.total.headcount,
            ..YearFlows::default()
        },
        metrics,
        population: initial.clone(),
    });

    let mut state = PopulationState {
        population: initial,
        pending_hires: Vec::new(),
    };
    for year in 1..=params.horizon_years {
        let outcome = advance_year(&state, year, params, bands, draws);
        state = outcome.state;
        years.push(YearlyState {
            year,
            calendar_year: calendar_year(params, year),
            metrics: aggregate(&state.population),
            population: state.population.clone(),
            flows: outcome.flows,
        });
    }
    years
}

fn calendar_year(params: &SimulationParameters, year: u32) -> Option<i32> {
    params.start_year.map(|start| start + year as i32)
}

/// Deterministic expected-value projection of one scenario.
///
/// # Errors
/// [`EngineError::Configuration`] before any year runs when the parameters
/// are invalid for `bands`; [`EngineError::Reconciliation`] when a year's
/// driver waterfall does not add up.
pub fn project(
    name: &str,
    snapshot: &[Entity],
    bands: &CohortBands,
    params: &SimulationParameters,
) -> Result<ScenarioResult, EngineError> {
    params.validate(bands)?;
    info!(
        "projecting scenario {name}: {} records, {} years, cohort bands v{}",
        snapshot.len(),
        params.horizon_years,
        bands.version
    );

    let initial = prepare_population(snapshot, bands, params);
    let years = simulate_years(initial, params, bands, &mut ExpectedValueDraws::new());

    let mut warnings = Vec::new();
    for state in &years {
        if state.year > 0 {
            state.waterfall().reconcile(name)?;
        }
        debug!(
            "scenario {name} year {}: headcount {:.2}, fte {:.2}, hires {:.2}, exits {:.2}",
            state.year,
            state.metrics.total.headcount,
            state.metrics.total.fte,
            state.flows.hires,
            state.flows.retirements + state.flows.attritions + state.flows.atz_exits
        );
        warnings.extend(unclassified_warnings(state.year, &state.population));
    }
    log_warnings(name, &warnings);

    Ok(ScenarioResult {
        name: name.to_string(),
        cohort_version: bands.version,
        parameters: params.clone(),
        years,
        monte_carlo: None,
        warnings,
    })
}

fn log_warnings(name: &str, warnings: &[DataQualityWarning]) {
    for warning in warnings {
        warn!(
            "scenario {name} year {}: {} has age {} outside every cohort band",
            warning.year, warning.entity_id, warning.age
        );
    }
}
