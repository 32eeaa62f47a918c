#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;

use cliagent::cli::{Cli, Commands};
use cliagent::config::Config;
use cliagent::error::AgentError;
use cliagent::{commands, logging};

/// Exit status after an interrupt, as shells report SIGINT.
const EXIT_CANCELLED: i32 = 130;
/// Exit status after a timeout, as `timeout(1)` reports it.
const EXIT_TIMED_OUT: i32 = 124;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let project_root = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = Config::load(&project_root)
        .with_context(|| format!("Failed to load configuration for {}", project_root.display()))?;

    match &cli.command {
        Commands::List => {
            commands::list::execute(&commands::registry(&config)?)?;
        }
        Commands::Doctor { json } => {
            commands::doctor::execute(&commands::registry(&config)?, *json)?;
        }
        Commands::Show { agent } => {
            commands::show::execute(&commands::registry(&config)?, agent)?;
        }
        Commands::Run(run) => {
            let config = config.with_cli_overrides(run);
            let registry = commands::registry(&config)?;

            let code = match commands::run::execute(&config, &registry, run) {
                Ok(code) => code,
                Err(e @ AgentError::Cancelled) => {
                    eprintln!("Error: {}", e);
                    EXIT_CANCELLED
                }
                Err(e @ AgentError::Timeout { .. }) => {
                    eprintln!("Error: {}", e);
                    EXIT_TIMED_OUT
                }
                Err(e) => return Err(e.into()),
            };
            std::process::exit(code);
        }
    }

    Ok(())
}
