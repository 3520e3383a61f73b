//! Impostor party game terminal entry point.

use std::io;

use impostor_cli::app::{Terminal, build_engine};
use impostor_cli::config::{CliConfig, LogFormat};
use impostor_cli::error::CliError;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), CliError> {
    // Read configuration from environment.
    let config = CliConfig::from_env()?;

    // Initialize tracing subscriber on stderr so it never interleaves with the game.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    tracing::info!(?config, "Starting Impostor");

    let mut engine = build_engine(&config)?;
    let mut terminal = Terminal::new(io::stdin().lock(), io::stdout().lock(), config.pass_delay);
    terminal.run(&mut engine)?;

    tracing::info!("Impostor closed");
    Ok(())
}
