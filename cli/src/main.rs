//! mplex binary.
//!
//! Entry point for the command line tool. Logs go to stderr; results are
//! printed to stdout as JSON.

use clap::Parser;
use mplex_cli::{load_registry, run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mplex_cli=debug,mplex_sdk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "Parsed arguments");

    let registry = load_registry(cli.config.as_deref(), &cli.idl)?;
    let output = run(&registry, &cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
