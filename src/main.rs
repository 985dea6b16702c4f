use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use workforce::commands::base_commands::{CliArgs, Commands};
use workforce::commands::compare_cmd::compare_command;
use workforce::commands::project_cmd::project_command;

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();
    match args.command {
        cmd @ Commands::Project { .. } => project_command(cmd),
        cmd @ Commands::Compare { .. } => compare_command(cmd),
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            generate(shell, &mut command, name, &mut std::io::stdout());
            ExitCode::SUCCESS
        }
    }
}
