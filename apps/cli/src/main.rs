#![allow(clippy::print_stderr, clippy::print_stdout)]

mod args;
mod handlers;

use crate::args::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use sdeck::{ErrorClass, StackError};
use sdeck_logger::Logger;
use std::process::ExitCode;
use tracing::error;

/// Exit status of configuration errors, matching clap's usage errors.
const EXIT_CONFIGURATION: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .console(true)
        .verbosity(cli.global.verbose, cli.global.quiet)
        .init()
    {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        },
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Stack errors already embed their causes; other errors carry them as a chain.
            let class = err.downcast_ref::<StackError>().map(StackError::class);
            match class {
                Some(class) => error!(class = <&'static str>::from(class), "{err}"),
                None => error!("{err:#}"),
            }
            if class == Some(ErrorClass::Configuration) {
                ExitCode::from(EXIT_CONFIGURATION)
            } else {
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let environment = handlers::environment(cli.global.env.as_deref())?;
    let config = cli.global.config.as_deref();

    match &cli.command {
        Commands::Synth { out } => handlers::synth::run(environment, config, out.as_deref()),
        Commands::Plan { json } => handlers::plan::run(environment, config, *json),
        Commands::Outputs { json } => handlers::outputs::run(environment, *json),
    }
}
