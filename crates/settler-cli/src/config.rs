//! Command-line configuration, read from environment variables.
//!
//! | Variable           | Meaning                                        | Default    |
//! |--------------------|------------------------------------------------|------------|
//! | `SETTLER_SEED`     | Board seed                                     | `0`        |
//! | `SETTLER_LAYOUT`   | `canonical` or `shuffled`                      | `canonical`|
//! | `SETTLER_BALANCED` | Keep 6/8 tokens apart (`true`/`false`)         | `false`    |
//! | `SETTLER_STRATEGY` | Built-in profile name or path to a JSON profile| `balanced` |
//! | `SETTLER_PLAYER`   | Player to advise                               | `0`        |
//! | `SETTLER_TOP_K`    | Number of recommendations                      | `5`        |
//! | `SETTLER_STATE`    | Path to a saved game state                     | none       |
//! | `SETTLER_FORMAT`   | `text` or `json`                               | `text`     |

use settler_core::{BoardConfig, GameState, LayoutMode, PlayerId, StrategyProfile};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors while reading configuration or the files it points to
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Unknown strategy {0:?} (not a built-in profile or an existing file)")]
    UnknownStrategy(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(()),
        }
    }
}

/// Where the strategy profile comes from
#[derive(Debug, Clone, PartialEq)]
pub enum StrategySource {
    Builtin(StrategyProfile),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub board: BoardConfig,
    pub strategy: StrategySource,
    pub player: PlayerId,
    pub top_k: usize,
    pub state_path: Option<PathBuf>,
    pub format: OutputFormat,
}

impl CliConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed = parse_var(&lookup, "SETTLER_SEED", 0u64)?;
        let layout = match lookup("SETTLER_LAYOUT") {
            None => LayoutMode::Canonical,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "canonical" => LayoutMode::Canonical,
                "shuffled" => LayoutMode::Shuffled,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "SETTLER_LAYOUT",
                        value,
                    })
                }
            },
        };
        let balanced_numbers = parse_var(&lookup, "SETTLER_BALANCED", false)?;

        let strategy = match lookup("SETTLER_STRATEGY") {
            None => StrategySource::Builtin(StrategyProfile::balanced()),
            Some(value) => match StrategyProfile::builtin(&value) {
                Some(profile) => StrategySource::Builtin(profile),
                None if Path::new(&value).is_file() => StrategySource::File(PathBuf::from(value)),
                None => return Err(ConfigError::UnknownStrategy(value)),
            },
        };

        let format = match lookup("SETTLER_FORMAT") {
            None => OutputFormat::Text,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "SETTLER_FORMAT",
                value,
            })?,
        };

        Ok(Self {
            board: BoardConfig {
                seed,
                layout,
                balanced_numbers,
                ..BoardConfig::default()
            },
            strategy,
            player: parse_var(&lookup, "SETTLER_PLAYER", 0)?,
            top_k: parse_var(&lookup, "SETTLER_TOP_K", 5)?,
            state_path: lookup("SETTLER_STATE").map(PathBuf::from),
            format,
        })
    }

    /// Resolve the strategy profile, reading it from disk if needed
    pub fn load_strategy(&self) -> Result<StrategyProfile, ConfigError> {
        match &self.strategy {
            StrategySource::Builtin(profile) => Ok(profile.clone()),
            StrategySource::File(path) => {
                let text = read(path)?;
                serde_json::from_str(&text).map_err(|e| ConfigError::Load {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Load the saved game state, or start an empty game
    pub fn load_state(&self) -> Result<GameState, ConfigError> {
        let Some(path) = &self.state_path else {
            return Ok(GameState::default());
        };
        let text = read(path)?;
        GameState::from_json(&text).map_err(|e| ConfigError::Load {
            path: path.clone(),
            message: e.to_string(),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
