//! List command implementation

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use super::open_library;

#[derive(Args)]
pub struct ListArgs {
    /// Komikku data directory (default: ~/.local/share/komikku)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config file (config.toml or config.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the library as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ListArgs) -> Result<()> {
    let (library, _config) = open_library(args.config.as_deref(), args.data_dir)?;
    let summaries = library.summaries()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Library: {}", library.data_dir().display());
    if summaries.is_empty() {
        println!("  (no manga)");
        return Ok(());
    }
    for summary in &summaries {
        println!(
            "  {:>4}  {}  {}",
            summary.manga.id,
            style(&summary.manga.name).bold(),
            style(format!(
                "({}, {} downloaded chapter(s))",
                summary.manga.server_id, summary.downloaded_chapters
            ))
            .dim()
        );
    }
    Ok(())
}
