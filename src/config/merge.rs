//! Layering of environment variables and CLI flags over the file config.

use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::path::PathBuf;

use crate::domain::{Config, CoverSource, OutputFormat};

pub const ENV_PREFIX: &str = "MANGA_VOLUMES_";

/// Values given on the command line; `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub cover: Option<CoverSource>,
    pub omnibus: Option<bool>,
    pub kcc_path: Option<PathBuf>,
}

/// Apply `MANGA_VOLUMES_*` variables; `__` separates nested keys.
pub fn apply_env(config: Config) -> Result<Config> {
    Figment::from(Serialized::defaults(config))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .with_context(|| format!("Invalid {ENV_PREFIX}* environment override"))
}

pub fn merge_cli_with_config(mut config: Config, cli: &CliOverrides) -> Config {
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(destination) = &cli.destination {
        config.destination = destination.clone();
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(cover) = cli.cover {
        config.cover = cover;
    }
    if let Some(omnibus) = cli.omnibus {
        config.omnibus = Some(omnibus);
    }
    if let Some(path) = &cli.kcc_path {
        config.kcc.binary = path.clone();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_win_over_config() {
        let config = Config { format: OutputFormat::Epub, ..Config::default() };
        let cli = CliOverrides {
            format: Some(OutputFormat::Cbz),
            kcc_path: Some(PathBuf::from("/opt/kcc/kcc-c2e")),
            ..CliOverrides::default()
        };
        let merged = merge_cli_with_config(config, &cli);
        assert_eq!(merged.format, OutputFormat::Cbz);
        assert_eq!(merged.kcc.binary, PathBuf::from("/opt/kcc/kcc-c2e"));
        assert_eq!(merged.cover, CoverSource::None);
    }

    #[test]
    fn empty_overrides_keep_config() {
        let config = Config { omnibus: Some(true), ..Config::default() };
        assert_eq!(merge_cli_with_config(config.clone(), &CliOverrides::default()), config);
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MANGA_VOLUMES_FORMAT", "cbz");
            jail.set_env("MANGA_VOLUMES_KCC__PROFILE", "KPW5");

            let config = apply_env(Config::default()).expect("env");
            assert_eq!(config.format, OutputFormat::Cbz);
            assert_eq!(config.kcc.profile, "KPW5");
            assert_eq!(config.kcc.batch_split, 0);
            Ok(())
        });
    }

    #[test]
    fn env_values_are_case_insensitive() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MANGA_VOLUMES_FORMAT", "MOBI");
            jail.set_env("MANGA_VOLUMES_COVER", "Remote");

            let config = apply_env(Config { format: OutputFormat::Epub, ..Config::default() })
                .expect("env");
            assert_eq!(config.format, OutputFormat::Mobi);
            assert_eq!(config.cover, CoverSource::Remote);
            Ok(())
        });
    }
}
