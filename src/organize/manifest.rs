//! `manifest.json` describing an organized destination.

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::Path;

use super::OrganizeReport;
use crate::domain::{Manga, OutputFormat, MANIFEST_SCHEMA_VERSION};
use crate::volume::Volume;

pub fn write_manifest(
    manifest_path: &Path,
    manga: &Manga,
    format: OutputFormat,
    volumes: &[Volume],
    report: &OrganizeReport,
    include_timestamp: bool,
) -> Result<()> {
    let mut entries = Vec::with_capacity(report.volumes.len());
    for written in &report.volumes {
        let Some(volume) = volumes.iter().find(|v| v.number == written.number) else {
            continue;
        };
        let chapters = volume
            .chapters
            .iter()
            .zip(&written.chapters)
            .map(|(chapter, out)| {
                json!({
                    "num": chapter.num,
                    "title": chapter.title,
                    "slug": chapter.slug,
                    "folder": out.folder,
                    "pages": out.pages,
                })
            })
            .collect::<Vec<_>>();
        entries.push(json!({
            "number": volume.number,
            "start": volume.start,
            "stop": volume.stop,
            "directory": written.dir.file_name().map(|n| n.to_string_lossy().into_owned()),
            "cover": written.has_cover,
            "pages": written.pages,
            "chapters": chapters,
        }));
    }

    let mut manifest = Map::new();
    manifest
        .insert("schema_version".to_string(), Value::String(MANIFEST_SCHEMA_VERSION.to_string()));
    if include_timestamp {
        manifest.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    manifest.insert("manga".to_string(), serde_json::to_value(manga)?);
    manifest.insert("format".to_string(), Value::String(format.kcc_name().to_string()));
    manifest.insert("volumes".to_string(), Value::Array(entries));
    if !report.skipped.is_empty() {
        manifest.insert("skipped_volumes".to_string(), serde_json::to_value(&report.skipped)?);
    }

    if let Some(parent) = manifest_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(manifest_path, serde_json::to_string_pretty(&Value::Object(manifest))?)
        .with_context(|| format!("Failed writing manifest {}", manifest_path.display()))?;
    Ok(())
}
