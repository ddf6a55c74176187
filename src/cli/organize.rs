//! Organize command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use super::{open_library_with, prompts};
use crate::config::CliOverrides;
use crate::convert::{list_outputs, plan_conversions, KccCommand};
use crate::cover::{fetch_volume_covers, CoverCache, MangaDexClient};
use crate::domain::{
    sanitize_file_name, Config, ConversionMode, CoverSource, Manga, OutputFormat, LOCAL_COVER_FILE,
    MANIFEST_FILE, OUTPUT_DIR_NAME,
};
use crate::library::paths::resolve_destination;
use crate::library::Library;
use crate::organize::{
    organize, prepare_destination, write_manifest, CoverImage, OrganizePlan, OrganizeReport,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_info, print_plan, print_step_header, print_success, print_warning, PlanSummary,
};
use crate::volume::{parse_stops, partition, Volume};

#[derive(Args, Default)]
pub struct OrganizeArgs {
    /// Path to config file (config.toml or config.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Komikku data directory (default: ~/.local/share/komikku)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Destination parent folder, relative to $HOME unless absolute
    #[arg(short = 'd', long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Manga to process: database id, exact name or unique part of the name
    #[arg(short = 'm', long, value_name = "MANGA")]
    pub manga: Option<String>,

    /// Output format: mobi, epub or cbz
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Cover source: none, local (Komikku cover.jpg) or remote (MangaDex)
    #[arg(long, value_name = "SOURCE")]
    pub cover: Option<CoverSource>,

    /// Volume stops, e.g. "8,17,25.5" (last chapter number of each volume)
    #[arg(short = 's', long, value_name = "STOPS")]
    pub stops: Option<String>,

    /// Convert every volume into a single book
    #[arg(long, conflicts_with = "per_volume")]
    pub omnibus: bool,

    /// Convert each volume into its own book
    #[arg(long)]
    pub per_volume: bool,

    /// Replace the destination folder if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Only organize the folders; do not run the converter
    #[arg(long)]
    pub skip_convert: bool,

    /// Path to the kcc-c2e executable
    #[arg(long, value_name = "PATH")]
    pub kcc_path: Option<PathBuf>,
}

impl OrganizeArgs {
    fn overrides(&self) -> CliOverrides {
        let omnibus = match (self.omnibus, self.per_volume) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        CliOverrides {
            data_dir: self.data_dir.clone(),
            destination: self.destination.clone(),
            format: self.format,
            cover: self.cover,
            omnibus,
            kcc_path: self.kcc_path.clone(),
        }
    }
}

pub fn run(args: OrganizeArgs) -> Result<()> {
    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    if !interactive {
        tracing::info!("non-interactive session detected; prompts are disabled");
    }

    let (library, mut config) = open_library_with(args.config.as_deref(), &args.overrides())?;
    print_banner(env!("CARGO_PKG_VERSION"));

    let parent = if interactive && args.destination.is_none() {
        prompts::prompt_destination(&config.destination)?
    } else {
        config.destination.clone()
    };
    let parent = resolve_destination(&parent);

    let manga = match (&args.manga, interactive) {
        (Some(query), _) => library.find_manga(query)?,
        (None, true) => prompts::select_manga(&library.mangas()?)?,
        (None, false) => {
            anyhow::bail!("--manga is required in non-interactive mode (see `manga-volumes list`)")
        }
    };

    if interactive && args.format.is_none() {
        config.format = prompts::select_format(config.format)?;
    }
    if interactive && args.cover.is_none() {
        config.cover = prompts::select_cover(config.cover)?;
    }

    let chapters = library.downloaded_chapters(&manga)?;
    if chapters.is_empty() {
        anyhow::bail!("'{}' has no downloaded chapters", manga.name);
    }

    let stops = match (&args.stops, interactive) {
        (Some(raw), _) => parse_stops(raw)?,
        (None, true) => prompts::collect_stops(&chapters)?,
        (None, false) => anyhow::bail!("--stops is required in non-interactive mode"),
    };
    let volumes = partition(&chapters, &stops)?;

    if interactive && config.omnibus.is_none() {
        let default = config.conversion_mode() == ConversionMode::Omnibus;
        config.omnibus = Some(prompts::confirm_omnibus(default)?);
    }
    let mode = config.conversion_mode();

    let destination = parent.join(sanitize_file_name(&manga.name));
    print_plan(&PlanSummary {
        manga: &manga.name,
        destination: &destination,
        format: config.format,
        cover: config.cover,
        mode,
        volumes: &volumes,
    });

    let mut overwrite = args.overwrite;
    if destination.exists() && !overwrite && interactive {
        overwrite = prompts::confirm_overwrite(&destination)?;
        if !overwrite {
            println!("Cancelled by user.");
            return Ok(());
        }
    }
    prepare_destination(&destination, overwrite)?;

    print_step_header(1, "Organizing volumes and chapters");
    let covers = gather_covers(&library, &manga, &config, &volumes);
    let plan = OrganizePlan {
        manga: &manga,
        source_dir: library.manga_dir(&manga),
        destination: destination.clone(),
        volumes: &volumes,
        covers,
    };
    let report = organize(&plan)?;
    for number in &report.skipped {
        print_warning(&format!("Volume {number} has no downloaded chapters and was skipped"));
    }
    print_success(&format!(
        "Organized {} volume(s), {} page(s)",
        report.volumes.len(),
        report.total_pages()
    ));

    let output_dir = destination.join(OUTPUT_DIR_NAME);
    if args.skip_convert {
        print_info("Skipping conversion (--skip-convert)");
    } else {
        print_step_header(2, &format!("Processing comics into .{}", config.format));
        convert_volumes(&config, mode, &manga, &destination, &output_dir, &report)?;
    }

    write_manifest(
        &destination.join(MANIFEST_FILE),
        &manga,
        config.format,
        &volumes,
        &report,
        true,
    )?;

    if args.skip_convert {
        print_completion(&destination);
    } else {
        print_completion(&output_dir);
    }
    Ok(())
}

fn gather_covers(
    library: &Library,
    manga: &Manga,
    config: &Config,
    volumes: &[Volume],
) -> BTreeMap<usize, CoverImage> {
    let mut covers = BTreeMap::new();
    match config.cover {
        CoverSource::None => {}
        CoverSource::Local => {
            let cover = library.manga_dir(manga).join(LOCAL_COVER_FILE);
            match volumes.iter().find(|v| !v.is_empty()) {
                Some(first) if cover.is_file() => {
                    covers.insert(first.number, CoverImage::File(cover));
                }
                Some(_) => {
                    print_warning(&format!("No Komikku cover found at {}", cover.display()));
                }
                None => {}
            }
        }
        CoverSource::Remote => {
            let client = match MangaDexClient::new(&config.catalog) {
                Ok(client) => client,
                Err(e) => {
                    print_warning(&format!("Cover catalog unavailable: {e}"));
                    return covers;
                }
            };
            let cache = if config.catalog.cache { CoverCache::default_location() } else { None };
            let wanted: Vec<usize> =
                volumes.iter().filter(|v| !v.is_empty()).map(|v| v.number).collect();

            let spinner = create_spinner("Fetching volume covers...");
            covers = fetch_volume_covers(&client, &manga.name, &wanted, cache.as_ref());
            if covers.is_empty() {
                finish_with_warning(&spinner, "No volume covers found; continuing without them");
            } else {
                finish_with_success(
                    &spinner,
                    &format!("Found covers for {} of {} volume(s)", covers.len(), wanted.len()),
                );
            }
        }
    }
    covers
}

fn convert_volumes(
    config: &Config,
    mode: ConversionMode,
    manga: &Manga,
    destination: &Path,
    output_dir: &Path,
    report: &OrganizeReport,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed creating {}", output_dir.display()))?;

    let jobs = plan_conversions(mode, &manga.name, destination, report);
    if mode == ConversionMode::Omnibus {
        print_info(&format!("Processing {} volumes...", report.volumes.len()));
    }

    let kcc = KccCommand::new(&config.kcc, config.format, output_dir.to_path_buf());
    for job in &jobs {
        let spinner = create_spinner(&format!("Processing {}...", job.title));
        match kcc.run(job) {
            Ok(_) => finish_with_success(&spinner, &format!("Built {}", job.title)),
            Err(e) => {
                finish_with_warning(&spinner, &format!("Failed to build {}", job.title));
                return Err(e.into());
            }
        }
    }

    let outputs = list_outputs(output_dir);
    if outputs.is_empty() {
        print_warning("The converter finished but wrote no files");
    }
    for file in &outputs {
        let name = file.strip_prefix(output_dir).unwrap_or(file);
        print_info(&name.display().to_string());
    }
    Ok(())
}
