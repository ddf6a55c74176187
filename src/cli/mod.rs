//! Command-line interface for manga-volumes
//!
//! `organize` (the default) walks through the Komikku → volumes → KCC flow;
//! `list` shows the library and `completions` prints shell completions.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{resolve_config, CliOverrides};
use crate::domain::Config;
use crate::library::{default_data_dir, Library};

mod list;
mod organize;
mod prompts;

/// Bundle downloaded Komikku chapters into volumes and convert them with KCC
#[derive(Parser)]
#[command(name = "manga-volumes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    organize: organize::OrganizeArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a manga into volumes and convert them (default)
    Organize(organize::OrganizeArgs),

    /// List the manga in the Komikku library
    List(list::ListArgs),

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Some(Commands::Organize(args)) => organize::run(args),
        Some(Commands::List(args)) => list::run(args),
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "manga-volumes", &mut std::io::stdout());
            Ok(())
        }
        None => organize::run(cli.organize),
    }
}

/// Resolve configuration and open the Komikku library it points at.
fn open_library_with(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<(Library, Config)> {
    let config = resolve_config(config_path, overrides)?;
    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()
            .context("Cannot locate the Komikku data directory; pass --data-dir")?,
    };
    let library = Library::open(&data_dir)?;
    Ok((library, config))
}

fn open_library(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> Result<(Library, Config)> {
    open_library_with(config_path, &CliOverrides { data_dir, ..CliOverrides::default() })
}
