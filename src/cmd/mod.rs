//! Command module structure for calcforge CLI

use anyhow::Result;
use std::path::{Path, PathBuf};

use calcforge::config::{Config, Overrides, CONFIG_PATH};

pub mod check;
pub mod generate;
pub mod init;
pub mod util;

/// Config path from `--config`, or the project default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH))
}

/// Load the config and apply command-line overrides.
///
/// An explicitly named config file must exist; the default one may be absent.
pub fn load_config(explicit: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(Path::new(CONFIG_PATH))?,
    };
    config.apply(overrides)?;
    Ok(config)
}
