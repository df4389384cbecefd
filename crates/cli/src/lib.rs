pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "flowgate",
    about = "Flowgate operator CLI",
    long_about = "Operate the Flowgate socket trigger bridge: run trigger nodes, inspect config, and check readiness.",
    after_help = "Examples:\n  flowgate run\n  flowgate run --node-version 2 --manual\n  flowgate config\n  flowgate doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start a socket trigger node and bridge events until shutdown")]
    Run {
        #[arg(long, default_value_t = 1, help = "Trigger node version to run (1 or 2)")]
        node_version: u8,
        #[arg(long, help = "Manual test invocation: capture the first matching event and exit")]
        manual: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and Slack credential readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { node_version, manual } => commands::run::run(node_version, manual),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
