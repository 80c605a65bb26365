use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use prioritizer::cli::handlers::{
    CommandContext, handle_init, handle_prioritize, handle_serve, handle_show,
};
use prioritizer::cli::{Cli, Commands};
use prioritizer::error::PrioritizerError;

fn main() -> ExitCode {
    // Secrets may live in a local .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    prioritizer::logging::init(cli.verbose, cli.log_file.clone());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { model, force } => handle_init(&cwd, model, force),
        Commands::Prioritize(args) => {
            let ctx = CommandContext::load(cli.config.as_deref(), cwd)?;
            handle_prioritize(&ctx, args)
        }
        Commands::Show { file, json } => handle_show(&file, json),
        Commands::Serve {
            port,
            completion,
            password,
        } => {
            let ctx = CommandContext::load(cli.config.as_deref(), cwd)?;
            handle_serve(&ctx, port, completion, password)
        }
    }
}

/// Input problems are warnings the user can fix; anything else is an error.
fn report(err: &anyhow::Error) {
    let validation = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<PrioritizerError>())
        .find(|cause| cause.is_validation());

    match validation {
        Some(cause) => eprintln!("{}: {}", "Warning".yellow().bold(), cause),
        None => eprintln!("{}: {:?}", "Error".red().bold(), err),
    }
}
