mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use capacity_planner::PlannerConfig;

use crate::cli::error::CliError;
use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    match run(cli) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = PlannerConfig::load(cli.global.config.as_deref())?;
    tracing::debug!(command = ?cli.command, ?config, "dispatching command");
    cli::commands::dispatch(cli.command, &config, cli.global.output)
}
