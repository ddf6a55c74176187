//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

pub mod loader;
pub mod merge;

pub use loader::{default_config_dir, load_config};
pub use merge::{apply_env, merge_cli_with_config, CliOverrides};

use crate::domain::Config;
use anyhow::Result;
use std::path::Path;

/// Full resolution: file (explicit or discovered), then environment, then CLI.
pub fn resolve_config(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Config> {
    let config_dir = default_config_dir();
    let file_config = load_config(config_dir.as_deref(), config_path)?;
    let with_env = apply_env(file_config)?;
    Ok(merge_cli_with_config(with_env, cli))
}
