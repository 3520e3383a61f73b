//! Impostor CLI error types.

use impostor_catalog::loader::LoadError;
use impostor_core::error::GameError;
use thiserror::Error;

/// Startup and runtime errors for the terminal front-end.
#[derive(Debug, Error)]
pub enum CliError {
    /// An environment variable holds an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The custom corpus could not be loaded.
    #[error("corpus error: {0}")]
    Corpus(#[from] LoadError),

    /// The session engine rejected an operation the front-end relies on.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Reading from or writing to the terminal failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
