#![warn(missing_docs)]

//! Entry point for the `toolbar-sim` binary.

mod cli;
mod error;
mod scenario;

use std::process;

use clap::Parser;
use tracing::{error, info};

use crate::{
    cli::{Cli, Commands},
    error::Result,
    scenario::Scenario,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    logging::init(&log.spec());

    match command {
        Commands::Run(args) => {
            let scenario = Scenario::load(&args.scenario)?;
            let report = scenario::run(&scenario)?;
            print!("{}", report.render());
        }
        Commands::Check(args) => {
            let scenario = Scenario::load(&args.scenario)?;
            info!(
                path = %args.scenario.display(),
                windows = scenario.windows.len(),
                steps = scenario.steps.len(),
                "scenario parsed"
            );
            println!("ok: {} steps", scenario.steps.len());
        }
    }
    Ok(())
}
