//! On-disk cache for downloaded cover images.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::library::paths::cache_root_dir;

pub struct CoverCache {
    dir: PathBuf,
}

impl CoverCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// `$XDG_CACHE_HOME/manga-volumes/covers`, when a cache root is known.
    pub fn default_location() -> Option<Self> {
        cache_root_dir().map(|root| Self::new(root.join("manga-volumes").join("covers")))
    }

    pub fn path_for(&self, url: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{extension}", cache_key(url)))
    }

    pub fn get(&self, url: &str, extension: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path_for(url, extension)).ok()
    }

    pub fn put(&self, url: &str, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed creating cover cache {}", self.dir.display()))?;
        let path = self.path_for(url, extension);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed writing cached cover {}", path.display()))?;
        Ok(path)
    }
}

pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.trim());
    format!("{:x}", hasher.finalize())
}
