use std::process::ExitCode;

use crate::commands::base_commands::{Commands, current_year};
use crate::commands::project_cmd::write_output;
use crate::commands::report_format::format_comparison_report;
use crate::services::scenario::{RunOverrides, compare_from_files};

pub fn compare_command(cmd: Commands) -> ExitCode {
    if let Commands::Compare {
        input,
        scenario_a,
        scenario_b,
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
        let report =
            match compare_from_files(&input, &scenario_a, &scenario_b, monte_carlo, &overrides) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Failed to compare scenarios: {e}");
                    return ExitCode::FAILURE;
                }
            };

        if let Err(e) = write_output(&output, format, &report) {
            eprintln!("Failed to write comparison output: {e}");
            return ExitCode::FAILURE;
        }
        println!("{}", format_comparison_report(&report));
        println!();
        println!(
            "Comparison of {} and {} written to {output}",
            report.a.scenario, report.b.scenario
        );
    }
    ExitCode::SUCCESS
}
