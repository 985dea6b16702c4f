use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project headcount, FTE and cost of a workforce snapshot
    Project {
        /// Snapshot YAML file
        #[arg(short, long)]
        input: String,
        /// Scenario YAML file (defaults apply when omitted)
        #[arg(short = 'c', long)]
        scenario: Option<String>,
        /// Output file
        #[arg(short, long)]
        output: String,
        /// Calendar year of the snapshot (scenario value, then current year, when omitted)
        #[arg(short = 'y', long)]
        start_year: Option<i32>,
        /// Add Monte Carlo confidence bands
        #[arg(short, long)]
        monte_carlo: bool,
        /// Number of Monte Carlo trials (overrides the scenario)
        #[arg(short = 'n', long)]
        trials: Option<usize>,
        /// Base random seed (overrides the scenario)
        #[arg(long)]
        seed: Option<u64>,
        /// Horizon in years (overrides the scenario)
        #[arg(long)]
        horizon: Option<u32>,
        /// Output file format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Compare two scenarios over the same snapshot
    Compare {
        /// Snapshot YAML file
        #[arg(short, long)]
        input: String,
        /// Scenario A YAML file
        #[arg(short = 'a', long)]
        scenario_a: String,
        /// Scenario B YAML file
        #[arg(short = 'b', long)]
        scenario_b: String,
        /// Output file
        #[arg(short, long)]
        output: String,
        /// Calendar year of the snapshot (scenario value, then current year, when omitted)
        #[arg(short = 'y', long)]
        start_year: Option<i32>,
        /// Add Monte Carlo confidence bands for both scenarios
        #[arg(short, long)]
        monte_carlo: bool,
        /// Number of Monte Carlo trials (overrides both scenarios)
        #[arg(short = 'n', long)]
        trials: Option<usize>,
        /// Base random seed (overrides both scenarios)
        #[arg(long)]
        seed: Option<u64>,
        /// Horizon in years (overrides both scenarios)
        #[arg(long)]
        horizon: Option<u32>,
        /// Output file format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub(crate) fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_leaves_start_year_unset_by_default() {
        let args = CliArgs::parse_from([
            "workforce",
            "project",
            "-i",
            "snapshot.yaml",
            "-o",
            "output.yaml",
        ]);

        if let Commands::Project {
            start_year,
            monte_carlo,
            format,
            scenario,
            ..
        } = args.command
        {
            assert_eq!(start_year, None);
            assert!(!monte_carlo);
            assert_eq!(format, OutputFormat::Yaml);
            assert_eq!(scenario, None);
        } else {
            panic!("expected project command");
        }
    }

    #[test]
    fn compare_parses_both_scenarios_and_overrides() {
        let args = CliArgs::parse_from([
            "workforce",
            "compare",
            "-i",
            "snapshot.yaml",
            "-a",
            "base.yaml",
            "-b",
            "lean.yaml",
            "-o",
            "output.json",
            "-m",
            "-n",
            "200",
            "--seed",
            "7",
            "-f",
            "json",
            "-y",
            "2031",
        ]);

        if let Commands::Compare {
            scenario_a,
            scenario_b,
            monte_carlo,
            trials,
            seed,
            format,
            start_year,
            ..
        } = args.command
        {
            assert_eq!(start_year, Some(2031));
            assert_eq!(scenario_a, "base.yaml");
            assert_eq!(scenario_b, "lean.yaml");
            assert!(monte_carlo);
            assert_eq!(trials, Some(200));
            assert_eq!(seed, Some(7));
            assert_eq!(format, OutputFormat::Json);
        } else {
            panic!("expected compare command");
        }
    }
}
