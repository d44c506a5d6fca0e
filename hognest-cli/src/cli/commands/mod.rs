pub mod config;
pub mod encode;
pub mod verify;

use anyhow::Result;
use hognest_core::{load_config, Config};
use std::path::Path;
use tracing::debug;

/// Load `path` if given, otherwise fall back to the built-in defaults
pub fn effective_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Ok(load_config(path)?)
        }
        None => Ok(Config::default()),
    }
}
