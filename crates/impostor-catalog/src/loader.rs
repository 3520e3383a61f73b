//! YAML corpus loading.
//!
//! A corpus file has the same shape as [`Corpus`]:
//!
//! ```yaml
//! word_pairs:
//!   - { civil: playa, impostor: piscina, category: lugares }
//! games:
//!   - id: impostor
//!     name: El Impostor
//!     description: Palabras parecidas.
//!     min_players: 3
//!     max_players: 12
//! ```

use std::path::Path;

use impostor_core::error::GameError;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::corpus::Corpus;

/// Failure while reading a corpus file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read corpus file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The YAML did not match the corpus shape.
    #[error("malformed corpus: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The corpus parsed but cannot be played.
    #[error(transparent)]
    Invalid(#[from] GameError),
}

impl From<LoadError> for GameError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Invalid(inner) => inner,
            other => GameError::Catalog(other.to_string()),
        }
    }
}

/// Parses and validates a corpus from YAML text.
///
/// # Errors
///
/// Returns `LoadError::Parse` on malformed YAML and `LoadError::Invalid` if
/// the corpus fails validation.
pub fn from_yaml_str(text: &str) -> Result<Corpus, LoadError> {
    let corpus: Corpus = serde_yaml::from_str(text)?;
    corpus.validate()?;
    Ok(corpus)
}

/// Reads, parses and validates a corpus file.
///
/// # Errors
///
/// Returns `LoadError::Io` if the file cannot be read, otherwise as
/// [`from_yaml_str`].
#[instrument(skip_all, fields(path = %path.display()))]
pub fn from_yaml_file(path: &Path) -> Result<Corpus, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let corpus = from_yaml_str(&text)?;
    debug!(
        word_pairs = corpus.word_pairs.len(),
        games = corpus.games.len(),
        "loaded corpus"
    );
    Ok(corpus)
}
