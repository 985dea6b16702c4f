use std::process::ExitCode;

use serde::Serialize;

use crate::commands::base_commands::{Commands, OutputFormat, current_year};
use crate::commands::report_format::format_forecast_report;
use crate::services::scenario::{RunOverrides, forecast_from_files};

pub fn project_command(cmd: Commands) -> ExitCode {
    if let Commands::Project {
        input,
        scenario,
        output,
        start_year,
        monte_carlo,
        trials,
        seed,
        horizon,
        format,
    } = cmd
    {
        let overrides = RunOverrides {
            start_year,
            fallback_start_year: Some(current_year()),
            trials,
            seed,
            horizon_years: horizon,
        };
        let report = match forecast_from_files(&input, scenario.as_deref(), monte_carlo, &overrides)
        {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Failed to project workforce: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Err(e) = write_output(&output, format, &report) {
            eprintln!("Failed to write projection output: {e}");
            return ExitCode::FAILURE;
        }
        println!("{}", format_forecast_report(&report));
        println!();
        println!("Projection for scenario {} written to {output}", report.scenario);
    }
    ExitCode::SUCCESS
}

pub(crate) fn write_output<T: Serialize>(
    path: &str,
    format: OutputFormat,
    value: &T,
) -> Result<(), String> {
    let contents = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string())?,
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string())?,
    };
    std::fs::write(path, contents).map_err(|e| e.to_string())
}
