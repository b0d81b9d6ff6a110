//! Runtime configuration read from `CODEWORD_*` environment variables.

use std::path::PathBuf;

use thiserror::Error;

use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("failed to read word list {}: {source}", path.display())]
    WordsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("word list has {found} words, at least {needed} are required")]
    TooFewWords { found: usize, needed: usize },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::config(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Newline-separated word list; the built-in list when unset.
    pub words_file: Option<PathBuf>,
    /// Fixed RNG seed for reproducible boards.
    pub rng_seed: Option<u64>,
    /// Extra attempts after a lost version race, when the client did not pin one.
    pub conflict_retries: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            words_file: None,
            rng_seed: None,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: get("CODEWORD_HOST").unwrap_or(defaults.host),
            port: parse_var(get("CODEWORD_PORT"), "CODEWORD_PORT", "a port number")?
                .unwrap_or(defaults.port),
            words_file: get("CODEWORD_WORDS_FILE").map(PathBuf::from),
            rng_seed: parse_var(get("CODEWORD_RNG_SEED"), "CODEWORD_RNG_SEED", "an unsigned integer")?,
            conflict_retries: parse_var(
                get("CODEWORD_CONFLICT_RETRIES"),
                "CODEWORD_CONFLICT_RETRIES",
                "an unsigned integer",
            )?
            .unwrap_or(defaults.conflict_retries),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                var,
                expected,
                value: raw,
            })
        })
        .transpose()
}
