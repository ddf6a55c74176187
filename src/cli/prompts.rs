//! Interactive prompts for the organize flow.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, FuzzySelect, Input, Select};
use std::path::{Path, PathBuf};

use crate::domain::{format_number, Chapter, CoverSource, Manga, OutputFormat};
use crate::utils::print_info;
use crate::volume::{StopCollector, StopDecision, VolumeError};

pub fn prompt_destination(default: &Path) -> Result<PathBuf> {
    let folder: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Destination Folder")
        .default(default.display().to_string())
        .interact_text()?;
    Ok(PathBuf::from(folder.trim()))
}

pub fn select_manga(mangas: &[Manga]) -> Result<Manga> {
    if mangas.is_empty() {
        anyhow::bail!("The Komikku library has no manga");
    }
    let names: Vec<&str> = mangas.iter().map(|m| m.name.as_str()).collect();
    let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select Manga")
        .default(0)
        .items(&names)
        .interact()?;
    mangas.get(selection).cloned().context("Selected manga is out of range")
}

pub fn select_format(default: OutputFormat) -> Result<OutputFormat> {
    let labels: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.kcc_name()).collect();
    let default_idx = OutputFormat::ALL.iter().position(|f| *f == default).unwrap_or(0);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Format")
        .default(default_idx)
        .items(&labels)
        .interact()?;
    Ok(OutputFormat::ALL[selection])
}

pub fn select_cover(default: CoverSource) -> Result<CoverSource> {
    let labels: Vec<&str> = CoverSource::ALL.iter().map(|c| c.label()).collect();
    let default_idx = CoverSource::ALL.iter().position(|c| *c == default).unwrap_or(0);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Custom Cover")
        .default(default_idx)
        .items(&labels)
        .interact()?;
    Ok(CoverSource::ALL[selection])
}

pub fn confirm_omnibus(default: bool) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Bundle every volume into a single book?")
        .default(default)
        .interact()?;
    Ok(confirmed)
}

pub fn confirm_overwrite(destination: &Path) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} already exists. Replace it?", destination.display()))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

fn parse_stop(value: &str) -> Result<f64, VolumeError> {
    let value = value.trim();
    let stop: f64 = value.parse().map_err(|_| VolumeError::Invalid(value.to_string()))?;
    if stop.is_finite() {
        Ok(stop)
    } else {
        Err(VolumeError::NotFinite(stop))
    }
}

/// Ask "Volume N stops at" until the last downloaded chapter is covered.
pub fn collect_stops(chapters: &[Chapter]) -> Result<Vec<f64>> {
    let (Some(first), Some(last)) = (chapters.first(), chapters.last()) else {
        anyhow::bail!("No chapters to split into volumes");
    };
    print_info(&format!(
        "Downloaded chapters: {} to {} ({} total)",
        format_number(first.num),
        format_number(last.num),
        chapters.len()
    ));

    let theme = ColorfulTheme::default();
    let mut collector = StopCollector::new(last.num);
    loop {
        let answer: String = Input::with_theme(&theme)
            .with_prompt(collector.prompt())
            .default(format_number(collector.default_stop()))
            .validate_with(|value: &String| -> Result<(), String> {
                let stop = parse_stop(value).map_err(|e| e.to_string())?;
                collector.check(stop).map_err(|e| e.to_string())
            })
            .interact_text()?;

        let stop = parse_stop(&answer)?;
        if collector.offer(stop)? == StopDecision::Complete {
            break;
        }
    }
    Ok(collector.into_stops())
}
