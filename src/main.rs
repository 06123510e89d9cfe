// Entrypoint for the CLI application.
// Keeps `main` small: set up logging, parse arguments, hand off to
// `commands::execute`. Any error ends the process with a non-zero status.

use clap::Parser;
use hackmycli::{cli::Cli, commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `RUST_LOG` wins over the verbosity flag.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::execute(cli, &mut std::io::stdout().lock())?;
    Ok(())
}
