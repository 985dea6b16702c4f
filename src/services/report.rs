use serde::Serialize;

use crate::domain::error::DataQualityWarning;
use crate::domain::parameters::SimulationParameters;
use crate::domain::waterfall::DriverWaterfall;
use crate::services::aggregation::{ForecastSeries, series};
use crate::services::comparison::{ScenarioComparison, YearDelta};
use crate::services::simulation_types::{MonteCarloBands, ScenarioResult};

/// Serialized output of a single scenario run.
#[derive(Serialize, Debug, Clone)]
pub struct ForecastReport {
    pub data_source: String,
    pub scenario: String,
    pub cohort_version: u32,
    pub parameters: SimulationParameters,
    pub series: ForecastSeries,
    pub waterfall: Vec<DriverWaterfall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<MonteCarloBands>,
    pub warnings: Vec<DataQualityWarning>,
}

impl ForecastReport {
    pub fn from_result(data_source: &str, result: &ScenarioResult) -> Self {
        Self {
            data_source: data_source.to_string(),
            scenario: result.name.clone(),
            cohort_version: result.cohort_version,
            parameters: result.parameters.clone(),
            series: series(&result.years),
            waterfall: result.waterfalls(),
            monte_carlo: result.monte_carlo.clone(),
            warnings: result.warnings.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct ComparisonReport {
    pub data_source: String,
    pub a: ForecastReport,
    pub b: ForecastReport,
    pub deltas: Vec<YearDelta>,
}

impl ComparisonReport {
    pub fn from_comparison(data_source: &str, comparison: &ScenarioComparison) -> Self {
        Self {
            data_source: data_source.to_string(),
            a: ForecastReport::from_result(data_source, &comparison.a),
            b: ForecastReport::from_result(data_source, &comparison.b),
            deltas: comparison.deltas.clone(),
        }
    }
}
