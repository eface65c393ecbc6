//! TOML configuration for the command-line front end.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "sokoban.toml";

const DATA_DIR_NAME: &str = "sokoban";
const FALLBACK_DATA_DIR: &str = "sokoban-data";

/// Settings read from `sokoban.toml`. Every key is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Root directory holding levels, profiles and save slots.
    pub(crate) data_dir: PathBuf,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub(crate) log_filter: String,
    /// Simulated time that passes before each scripted move.
    pub(crate) seconds_per_move: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_filter: "info".to_owned(),
            seconds_per_move: 0.5,
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, `sokoban.toml` in the working
    /// directory is used when present and defaults apply otherwise.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                bail!("config file {} does not exist", path.display());
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses configuration text and validates its values.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        if !config.seconds_per_move.is_finite() || config.seconds_per_move < 0.0 {
            bail!(
                "seconds_per_move must be a non-negative number, got {}",
                config.seconds_per_move
            );
        }
        Ok(config)
    }

    /// Directory of the bundled, standard-format level files.
    pub(crate) fn levels_dir(&self) -> PathBuf {
        self.data_dir.join("levels")
    }

    /// Directory of player-authored level files.
    pub(crate) fn authored_dir(&self) -> PathBuf {
        self.data_dir.join("authored")
    }

    /// Directory of profile records.
    pub(crate) fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join("profiles")
    }

    /// Directory of save slot records.
    pub(crate) fn saves_dir(&self) -> PathBuf {
        self.data_dir.join("saves")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}
