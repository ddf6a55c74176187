//! Volume cover art from a remote catalog.
//!
//! Covers are best effort: lookup failures are logged and the volumes are
//! converted without them.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::organize::{page_extension, CoverImage};

pub mod cache;
pub mod mangadex;

pub use cache::CoverCache;
pub use mangadex::MangaDexClient;

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("No catalog entry found for '{0}'")]
    NoMatch(String),
}

/// One cover listed by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeCover {
    /// Catalog volume label, e.g. `"3"`; `None` for unnumbered art.
    pub volume: Option<String>,
    pub file_name: String,
    pub url: String,
}

impl VolumeCover {
    /// Integer volume number, if the label is one.
    pub fn volume_number(&self) -> Option<usize> {
        let label = self.volume.as_deref()?.trim();
        if let Ok(n) = label.parse::<usize>() {
            return Some(n);
        }
        let value: f64 = label.parse().ok()?;
        (value.fract() == 0.0 && value >= 0.0).then_some(value as usize)
    }
}

pub trait CoverProvider {
    fn volume_covers(&self, title: &str) -> Result<Vec<VolumeCover>, CoverError>;
    fn download(&self, cover: &VolumeCover) -> Result<Vec<u8>, CoverError>;
}

/// First cover listed for each integer volume.
pub fn covers_by_volume(covers: &[VolumeCover]) -> BTreeMap<usize, &VolumeCover> {
    let mut map = BTreeMap::new();
    for cover in covers {
        if let Some(number) = cover.volume_number() {
            map.entry(number).or_insert(cover);
        }
    }
    map
}

/// Fetch covers for the requested volume numbers.
///
/// Volumes without catalog art are simply absent from the result.
pub fn fetch_volume_covers(
    provider: &dyn CoverProvider,
    title: &str,
    volumes: &[usize],
    cache: Option<&CoverCache>,
) -> BTreeMap<usize, CoverImage> {
    let listed = match provider.volume_covers(title) {
        Ok(listed) => listed,
        Err(e) => {
            tracing::warn!("Cover lookup for '{}' failed: {}", title, e);
            return BTreeMap::new();
        }
    };
    let by_volume = covers_by_volume(&listed);

    let mut images = BTreeMap::new();
    for &number in volumes {
        let Some(cover) = by_volume.get(&number) else {
            tracing::info!("No catalog cover for volume {}", number);
            continue;
        };
        let extension = page_extension(std::path::Path::new(&cover.file_name));

        if let Some(bytes) = cache.and_then(|c| c.get(&cover.url, &extension)) {
            tracing::debug!("Cover for volume {} served from cache", number);
            images.insert(number, CoverImage::Downloaded { bytes, extension });
            continue;
        }

        match provider.download(cover) {
            Ok(bytes) => {
                if let Some(cache) = cache {
                    if let Err(e) = cache.put(&cover.url, &extension, &bytes) {
                        tracing::warn!("{:#}", e);
                    }
                }
                images.insert(number, CoverImage::Downloaded { bytes, extension });
            }
            Err(e) => tracing::warn!("Cover download for volume {} failed: {}", number, e),
        }
    }
    images
}
