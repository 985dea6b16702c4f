use log::info;
use serde::Serialize;

use crate::domain::cohort::CohortBands;
use crate::domain::entity::Entity;
use crate::domain::error::EngineError;
use crate::domain::parameters::SimulationParameters;
use crate::domain::waterfall::DriverWaterfall;
use crate::services::scenario::run_scenario;
use crate::services::simulation_types::ScenarioResult;

/// A named parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub parameters: SimulationParameters,
}

impl Scenario {
    pub fn new(name: &str, parameters: SimulationParameters) -> Self {
        Self {
            name: name.to_string(),
            parameters,
        }
    }
}

/// Per-year difference `B - A`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct YearDelta {
    pub year: u32,
    pub calendar_year: Option<i32>,
    pub headcount_a: f64,
    pub headcount_b: f64,
    pub headcount: f64,
    pub fte: f64,
    pub cost: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct ScenarioComparison {
    pub a: ScenarioResult,
    pub b: ScenarioResult,
    pub deltas: Vec<YearDelta>,
    pub waterfall_a: Vec<DriverWaterfall>,
    pub waterfall_b: Vec<DriverWaterfall>,
}

/// Runs both scenarios over the same snapshot and bands and lines them up
/// year by year. Years beyond the shorter horizon are not compared.
///
/// # Errors
/// Configuration errors of either scenario, or a waterfall that does not
/// reconcile.
pub fn compare(
    snapshot: &[Entity],
    bands: &CohortBands,
    a: &Scenario,
    b: &Scenario,
    monte_carlo: bool,
) -> Result<ScenarioComparison, EngineError> {
    info!("comparing scenario {} against {}", b.name, a.name);
    let result_a = run_scenario(&a.name, snapshot, bands, &a.parameters, monte_carlo)?;
    let result_b = run_scenario(&b.name, snapshot, bands, &b.parameters, monte_carlo)?;

    let waterfall_a = reconciled_waterfalls(&result_a)?;
    let waterfall_b = reconciled_waterfalls(&result_b)?;

    let deltas = result_a
        .years
        .iter()
        .zip(&result_b.years)
        .map(|(year_a, year_b)| {
            let (total_a, total_b) = (&year_a.metrics.total, &year_b.metrics.total);
            YearDelta {
                year: year_a.year,
                calendar_year: year_a.calendar_year.or(year_b.calendar_year),
                headcount_a: total_a.headcount,
                headcount_b: total_b.headcount,
                headcount: total_b.headcount - total_a.headcount,
                fte: total_b.fte - total_a.fte,
                cost: total_b.cost - total_a.cost,
            }
        })
        .collect();

    Ok(ScenarioComparison {
        a: result_a,
        b: result_b,
        deltas,
        waterfall_a,
        waterfall_b,
    })
}

fn reconciled_waterfalls(result: &ScenarioResult) -> Result<Vec<DriverWaterfall>, EngineError> {
    let waterfalls = result.waterfalls();
    for waterfall in &waterfalls {
        waterfall.reconcile(&result.name)?;
    }
    Ok(waterfalls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::uniform_population;

    fn attrition(rate: f64) -> SimulationParameters {
        SimulationParameters {
            default_attrition_rate: rate,
            replacement_ratio: 1.0,
            horizon_years: 5,
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn higher_attrition_lowers_headcount_every_year() {
        let snapshot = uniform_population(100, 35.0, "Ops");
        let comparison = compare(
            &snapshot,
            &CohortBands::standard(),
            &Scenario::new("A", attrition(0.05)),
            &Scenario::new("B", attrition(0.15)),
            false,
        )
        .unwrap();

        assert_eq!(comparison.deltas.len(), 6);
        assert_eq!(comparison.deltas[0].headcount, 0.0);
        for delta in &comparison.deltas[1..] {
            assert!(delta.headcount < 0.0, "year {} delta {}", delta.year, delta.headcount);
            assert!(delta.headcount_b <= delta.headcount_a);
        }
    }

    #[test]
    fn waterfalls_reconcile_for_both_scenarios() {
        let snapshot = uniform_population(20, 60.0, "Ops");
        let b = SimulationParameters {
            atz_enrollment_rate: 0.3,
            atz_phase_length_years: 1,
            ..attrition(0.1)
        };
        let comparison = compare(
            &snapshot,
            &CohortBands::standard(),
            &Scenario::new("A", attrition(0.1)),
            &Scenario::new("B", b),
            false,
        )
        .unwrap();

        assert_eq!(comparison.waterfall_a.len(), 5);
        assert_eq!(comparison.waterfall_b.len(), 5);
        for waterfall in comparison.waterfall_a.iter().chain(&comparison.waterfall_b) {
            let rebuilt = waterfall.start_headcount + waterfall.net_change();
            assert!((rebuilt - waterfall.end_headcount).abs() <= 1e-6);
        }
        assert!(comparison.waterfall_b.iter().any(|waterfall| waterfall.atz_exits > 0.0));
    }

    #[test]
    fn invalid_second_scenario_fails_the_comparison() {
        let b = SimulationParameters {
            replacement_ratio: 2.0,
            ..SimulationParameters::default()
        };
        let error = compare(
            &[],
            &CohortBands::standard(),
            &Scenario::new("A", SimulationParameters::default()),
            &Scenario::new("B", b),
            false,
        )
        .unwrap_err();
        assert!(matches!(error, EngineError::Configuration(_)));
    }
}
