//! XDG path helpers for the reader data, our config and our cache.

use std::path::PathBuf;

pub fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
}

/// Komikku's data directory: `$XDG_DATA_HOME/komikku` or `~/.local/share/komikku`.
pub fn default_data_dir() -> Option<PathBuf> {
    data_root_dir().map(|root| root.join("komikku"))
}

pub fn data_root_dir() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME").or_else(|| home_dir().map(|home| home.join(".local").join("share")))
}

pub fn config_root_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME").or_else(|| home_dir().map(|home| home.join(".config")))
}

pub fn cache_root_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        xdg_dir("XDG_CACHE_HOME").or_else(|| home_dir().map(|home| home.join(".cache")))
    }
}

/// Destination parents are relative to the home directory unless absolute.
pub fn resolve_destination(destination: &std::path::Path) -> PathBuf {
    if destination.is_absolute() {
        return destination.to_path_buf();
    }
    match home_dir() {
        Some(home) => home.join(destination),
        None => destination.to_path_buf(),
    }
}

fn xdg_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from).filter(|p| p.is_absolute())
}
