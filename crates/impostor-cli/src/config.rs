//! Startup configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CliError;

/// Pause before the device is passed on, when `IMPOSTOR_PASS_DELAY_MS` is unset.
pub const DEFAULT_PASS_DELAY_MS: u64 = 2000;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::Config(format!(
                "IMPOSTOR_LOG_FORMAT must be `text` or `json`, got `{other}`"
            ))),
        }
    }
}

/// Settings for one run of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Seed for the random source; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// YAML corpus replacing the built-in one.
    pub corpus_path: Option<PathBuf>,
    /// Pause before the device is passed to the next player.
    pub pass_delay: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            seed: None,
            corpus_path: None,
            pass_delay: Duration::from_millis(DEFAULT_PASS_DELAY_MS),
            log_format: LogFormat::Text,
        }
    }
}

impl CliConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let seed = lookup("IMPOSTOR_SEED")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| CliError::Config(format!("IMPOSTOR_SEED must be a valid u64: {e}")))
            })
            .transpose()?;

        let corpus_path = lookup("IMPOSTOR_CORPUS")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        let pass_delay_ms: u64 = lookup("IMPOSTOR_PASS_DELAY_MS")
            .unwrap_or_else(|| DEFAULT_PASS_DELAY_MS.to_string())
            .trim()
            .parse()
            .map_err(|e| {
                CliError::Config(format!("IMPOSTOR_PASS_DELAY_MS must be a valid u64: {e}"))
            })?;

        let log_format = lookup("IMPOSTOR_LOG_FORMAT")
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            seed,
            corpus_path,
            pass_delay: Duration::from_millis(pass_delay_ms),
            log_format,
        })
    }
}
