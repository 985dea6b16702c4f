use crate::services::report::{ComparisonReport, ForecastReport};
use crate::services::simulation_types::YearBands;

pub fn format_forecast_report(report: &ForecastReport) -> String {
    let mut lines = Vec::new();
    lines.push("Workforce Projection".to_string());
    lines.push(format!("Scenario: {}", report.scenario));
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("Cohort bands: v{}", report.cohort_version));
    lines.push(format!("Horizon: {} years", report.parameters.horizon_years));
    lines.push(String::new());
    lines.push("Year | Headcount | FTE | Cost | Hires | Exits".to_string());
    lines.push("-----|-----------|-----|------|-------|------".to_string());

    let series = &report.series;
    for (idx, year) in series.years.iter().enumerate() {
        let (hires, exits) = match idx.checked_sub(1).and_then(|i| report.waterfall.get(i)) {
            Some(waterfall) => (
                format!("{:.2}", waterfall.hires),
                format!(
                    "{:.2}",
                    waterfall.retirements + waterfall.attritions + waterfall.atz_exits
                ),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        lines.push(format!(
            "{year} | {headcount:.2} | {fte:.2} | {cost:.0} | {hires} | {exits}",
            year = year_label(*year, series.calendar_years[idx]),
            headcount = series.total.headcount[idx],
            fte = series.total.fte[idx],
            cost = series.total.cost[idx],
        ));
    }

    if let Some(monte_carlo) = &report.monte_carlo {
        lines.push(String::new());
        lines.push(format!(
            "Monte Carlo headcount ({} trials, seed {}):",
            monte_carlo.trials, monte_carlo.seed
        ));
        let header: Vec<String> = monte_carlo
            .percentiles
            .iter()
            .map(|percentile| format!("P{percentile}"))
            .collect();
        lines.push(format!("Year | Mean | {}", header.join(" | ")));
        for year in &monte_carlo.years {
            lines.push(format_band_row(year));
        }
    }

    if !report.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Warnings: {} unclassified age records",
            report.warnings.len()
        ));
    }

    lines.join("\n")
}

pub fn format_comparison_report(report: &ComparisonReport) -> String {
    let mut lines = Vec::new();
    lines.push("Scenario Comparison".to_string());
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("A: {}", report.a.scenario));
    lines.push(format!("B: {}", report.b.scenario));
    lines.push(String::new());
    lines.push("Year | Headcount A | Headcount B | Delta | FTE Delta | Cost Delta".to_string());
    lines.push("-----|-------------|-------------|-------|-----------|-----------".to_string());
    for delta in &report.deltas {
        lines.push(format!(
            "{} | {:.2} | {:.2} | {:+.2} | {:+.2} | {:+.0}",
            year_label(delta.year, delta.calendar_year),
            delta.headcount_a,
            delta.headcount_b,
            delta.headcount,
            delta.fte,
            delta.cost
        ));
    }
    lines.join("\n")
}

fn format_band_row(year: &YearBands) -> String {
    let band = &year.total.headcount;
    let values: Vec<String> = band
        .percentiles
        .iter()
        .map(|p| format!("{:.2}", p.value))
        .collect();
    format!(
        "{} | {:.2} | {}",
        year_label(year.year, year.calendar_year),
        band.mean,
        values.join(" | ")
    )
}

fn year_label(year: u32, calendar_year: Option<i32>) -> String {
    match calendar_year {
        Some(calendar_year) => calendar_year.to_string(),
        None => format!("+{year}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cohort::CohortBands;
    use crate::domain::parameters::SimulationParameters;
    use crate::services::comparison::{Scenario, compare};
    use crate::services::scenario::run_scenario;
    use crate::test_support::{build_employee, uniform_population};

    fn params() -> SimulationParameters {
        SimulationParameters {
            horizon_years: 2,
            start_year: Some(2026),
            trials: 5,
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn format_forecast_report_includes_header_and_table() {
        let mut snapshot = uniform_population(4, 40.0, "Ops");
        snapshot.push(build_employee("E-young", 12.0, "Ops"));
        let result =
            run_scenario("base", &snapshot, &CohortBands::standard(), &params(), true).unwrap();
        let output = format_forecast_report(&ForecastReport::from_result("staff.yaml", &result));

        assert!(output.contains("Workforce Projection"));
        assert!(output.contains("Scenario: base"));
        assert!(output.contains("Data source: staff.yaml"));
        assert!(output.contains("Year | Headcount | FTE | Cost | Hires | Exits"));
        assert!(output.contains("2026 | 5.00 | 5.00 | 300000 | - | -"));
        assert!(output.contains("Monte Carlo headcount (5 trials, seed 42):"));
        assert!(output.contains("Year | Mean | P10 | P90"));
        assert!(output.contains("Warnings:"));
    }

    #[test]
    fn format_comparison_report_lists_signed_deltas() {
        let snapshot = uniform_population(10, 40.0, "Ops");
        let b = SimulationParameters {
            default_attrition_rate: 0.2,
            ..params()
        };
        let comparison = compare(
            &snapshot,
            &CohortBands::standard(),
            &Scenario::new("A", params()),
            &Scenario::new("B", b),
            false,
        )
        .unwrap();
        let output =
            format_comparison_report(&ComparisonReport::from_comparison("staff.yaml", &comparison));

        assert!(output.contains("Scenario Comparison"));
        assert!(output.contains("A: A"));
        assert!(output.contains("B: B"));
        assert!(output.contains("2026 | 10.00 | 10.00 | +0.00"));
        assert!(output.contains("2027 | "));
        assert!(output.contains("| -"));
    }
}
