//! Copy downloaded chapters into `Volume N/<chapter>/` folders.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{Chapter, Manga};
use crate::utils::progress::create_progress_bar;
use crate::volume::Volume;

pub mod manifest;
pub mod pages;

pub use manifest::write_manifest;
pub use pages::{list_pages, natural_cmp, page_extension};

/// Cover image to place in front of a volume's first page.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverImage {
    File(PathBuf),
    Downloaded { bytes: Vec<u8>, extension: String },
}

impl CoverImage {
    fn extension(&self) -> String {
        match self {
            CoverImage::File(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
                .unwrap_or_else(|| "jpg".to_string()),
            CoverImage::Downloaded { extension, .. } => extension.clone(),
        }
    }

    fn write_to(&self, target: &Path) -> Result<()> {
        match self {
            CoverImage::File(source) => {
                fs::copy(source, target).with_context(|| {
                    format!("Failed copying cover {} to {}", source.display(), target.display())
                })?;
            }
            CoverImage::Downloaded { bytes, .. } => {
                fs::write(target, bytes)
                    .with_context(|| format!("Failed writing cover {}", target.display()))?;
            }
        }
        Ok(())
    }
}

pub struct OrganizePlan<'a> {
    pub manga: &'a Manga,
    /// Komikku folder holding one sub-folder per chapter slug.
    pub source_dir: PathBuf,
    pub destination: PathBuf,
    pub volumes: &'a [Volume],
    /// Covers keyed by volume number.
    pub covers: BTreeMap<usize, CoverImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterReport {
    pub slug: String,
    pub folder: String,
    pub pages: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeReport {
    pub number: usize,
    pub dir: PathBuf,
    pub chapters: Vec<ChapterReport>,
    /// Pages written, cover included.
    pub pages: usize,
    pub has_cover: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizeReport {
    pub volumes: Vec<VolumeReport>,
    /// Volume numbers whose range held no downloaded chapter.
    pub skipped: Vec<usize>,
}

impl OrganizeReport {
    pub fn total_pages(&self) -> usize {
        self.volumes.iter().map(|v| v.pages).sum()
    }
}

/// Remove an existing destination (when allowed) and create it empty.
pub fn prepare_destination(destination: &Path, overwrite: bool) -> Result<()> {
    if destination.exists() {
        if !overwrite {
            bail!(
                "Destination already exists: {} (use --overwrite to replace it)",
                destination.display()
            );
        }
        if !destination.is_dir() {
            bail!("Destination exists and is not a directory: {}", destination.display());
        }
        tracing::info!("Removing existing destination {}", destination.display());
        fs::remove_dir_all(destination)
            .with_context(|| format!("Failed removing {}", destination.display()))?;
    }
    fs::create_dir_all(destination)
        .with_context(|| format!("Failed creating destination {}", destination.display()))?;
    Ok(())
}

struct ChapterPages<'a> {
    chapter: &'a Chapter,
    pages: Vec<PathBuf>,
}

/// Copy every page of every non-empty volume into the destination.
///
/// Pages are renamed `<counter>.<ext>` with one counter per volume, so the
/// reading order survives any converter that sorts by file name.
pub fn organize(plan: &OrganizePlan<'_>) -> Result<OrganizeReport> {
    // List everything up front so a missing chapter folder fails before any copy.
    let mut listed: Vec<(&Volume, Vec<ChapterPages<'_>>)> = Vec::new();
    let mut report = OrganizeReport::default();
    for volume in plan.volumes {
        if volume.is_empty() {
            tracing::warn!("{} has no downloaded chapters; skipping it", volume.dir_name());
            report.skipped.push(volume.number);
            continue;
        }
        let mut chapters = Vec::with_capacity(volume.chapters.len());
        for chapter in &volume.chapters {
            let dir = plan.source_dir.join(&chapter.slug);
            if !dir.is_dir() {
                bail!("Chapter '{}' is missing on disk: {}", chapter.slug, dir.display());
            }
            chapters.push(ChapterPages { chapter, pages: list_pages(&dir)? });
        }
        listed.push((volume, chapters));
    }

    let total: usize = listed
        .iter()
        .map(|(volume, chapters)| {
            chapters.iter().map(|c| c.pages.len()).sum::<usize>()
                + usize::from(plan.covers.contains_key(&volume.number))
        })
        .sum();
    tracing::info!(
        "Organizing {} volume(s), {} page(s) of '{}' into {}",
        listed.len(),
        total,
        plan.manga.name,
        plan.destination.display()
    );
    let pb = create_progress_bar(total as u64, "Copying pages");

    for (volume, chapters) in listed {
        let volume_dir = plan.destination.join(volume.dir_name());
        fs::create_dir_all(&volume_dir)
            .with_context(|| format!("Failed creating {}", volume_dir.display()))?;

        let mut counter = 0usize;
        let mut used: HashSet<String> = HashSet::new();
        let mut chapter_reports = Vec::with_capacity(chapters.len());
        let cover = plan.covers.get(&volume.number);

        for (idx, entry) in chapters.iter().enumerate() {
            let folder = unique_folder(&mut used, entry.chapter.folder_name());
            let chapter_dir = volume_dir.join(&folder);
            fs::create_dir_all(&chapter_dir)
                .with_context(|| format!("Failed creating {}", chapter_dir.display()))?;

            let before = counter;
            if let (0, Some(cover)) = (idx, cover) {
                let target = chapter_dir.join(format!("{counter}.{}", cover.extension()));
                cover.write_to(&target)?;
                counter += 1;
                pb.inc(1);
            }

            for page in &entry.pages {
                let target = chapter_dir.join(format!("{counter}.{}", page_extension(page)));
                fs::copy(page, &target).with_context(|| {
                    format!("Failed copying {} to {}", page.display(), target.display())
                })?;
                counter += 1;
                pb.inc(1);
            }

            tracing::debug!(
                "{} / {}: {} page(s) from {}",
                volume.dir_name(),
                folder,
                counter - before,
                entry.chapter.slug
            );
            chapter_reports.push(ChapterReport {
                slug: entry.chapter.slug.clone(),
                folder,
                pages: counter - before,
            });
        }

        report.volumes.push(VolumeReport {
            number: volume.number,
            dir: volume_dir,
            chapters: chapter_reports,
            pages: counter,
            has_cover: cover.is_some(),
        });
    }

    pb.finish_and_clear();
    Ok(report)
}

/// First of `name`, `name (2)`, `name (3)`... not yet handed out in this volume.
fn unique_folder(used: &mut HashSet<String>, name: String) -> String {
    let mut candidate = name.clone();
    let mut n = 1usize;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("{name} ({n})");
    }
    used.insert(candidate.clone());
    candidate
}
