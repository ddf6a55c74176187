//! Page discovery inside a chapter folder.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

static NUMBER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|\D+").expect("valid regex"));

pub const DEFAULT_PAGE_EXTENSION: &str = "png";

/// Regular files of `chapter_dir` in natural order (`2.jpg` before `10.jpg`).
///
/// Hidden files are ignored.
pub fn list_pages(chapter_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(chapter_dir)
        .with_context(|| format!("Failed reading chapter folder: {}", chapter_dir.display()))?;

    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_file() {
            pages.push(entry.path());
        }
    }

    pages.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(pages)
}

/// Lower-cased extension of a page, `png` when it has none.
pub fn page_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_PAGE_EXTENSION.to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Compare strings treating digit runs as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = NUMBER_RUN.find_iter(a).map(|m| m.as_str());
    let mut right = NUMBER_RUN.find_iter(b).map(|m| m.as_str());

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (is_digits(x), is_digits(y)) {
                    (true, true) => compare_digits(x, y),
                    _ => x.to_lowercase().cmp(&y.to_lowercase()),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn compare_digits(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}
