//! Core types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DESTINATION: &str = "Documents/Manga";
pub const DATABASE_FILE: &str = "komikku.db";
pub const LOCAL_COVER_FILE: &str = "cover.jpg";
pub const OUTPUT_DIR_NAME: &str = "Output";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0.0";

/// A manga row from the reader database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manga {
    pub id: i64,
    pub server_id: String,
    pub name: String,
}

/// A downloaded chapter of a manga.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub slug: String,
    pub title: Option<String>,
    pub num: f64,
}

impl Chapter {
    /// Folder name used inside a volume directory.
    ///
    /// Falls back to `Chapter <num>` when the title is missing or blank.
    pub fn folder_name(&self) -> String {
        let raw = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Chapter {}", format_number(self.num)),
        };
        sanitize_file_name(&raw)
    }
}

/// Render a chapter number without a trailing `.0`.
pub fn format_number(num: f64) -> String {
    if num.fract() == 0.0 && num.abs() < 1e15 {
        format!("{}", num as i64)
    } else {
        format!("{}", num)
    }
}

/// Replace path separators and NUL so a title can be used as a directory name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String =
        name.chars().map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c }).collect();
    let trimmed = cleaned.trim();
    match trimmed {
        "" => "_".to_string(),
        "." | ".." => trimmed.replace('.', "_"),
        other => other.to_string(),
    }
}

/// E-book format produced by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OutputFormat {
    #[default]
    Mobi,
    Epub,
    Cbz,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Mobi, OutputFormat::Epub, OutputFormat::Cbz];

    /// Name passed to `kcc-c2e -f`.
    pub fn kcc_name(self) -> &'static str {
        match self {
            OutputFormat::Mobi => "MOBI",
            OutputFormat::Epub => "EPUB",
            OutputFormat::Cbz => "CBZ",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kcc_name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobi" => Ok(OutputFormat::Mobi),
            "epub" => Ok(OutputFormat::Epub),
            "cbz" => Ok(OutputFormat::Cbz),
            other => Err(format!("Invalid output format '{other}'. Expected mobi, epub or cbz")),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where volume cover images come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CoverSource {
    #[default]
    None,
    /// The `cover.jpg` Komikku keeps next to the chapters, placed before volume 1.
    Local,
    /// Per-volume covers from the remote catalog.
    Remote,
}

impl CoverSource {
    pub const ALL: [CoverSource; 3] = [CoverSource::None, CoverSource::Local, CoverSource::Remote];

    pub fn label(self) -> &'static str {
        match self {
            CoverSource::None => "No custom cover",
            CoverSource::Local => "Komikku cover (volume 1 only)",
            CoverSource::Remote => "MangaDex volume covers",
        }
    }
}

impl fmt::Display for CoverSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoverSource::None => "none",
            CoverSource::Local => "local",
            CoverSource::Remote => "remote",
        };
        f.write_str(name)
    }
}

impl FromStr for CoverSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "no" | "off" => Ok(CoverSource::None),
            "local" | "komikku" => Ok(CoverSource::Local),
            "remote" | "mangadex" => Ok(CoverSource::Remote),
            other => Err(format!("Invalid cover source '{other}'. Expected none, local or remote")),
        }
    }
}

impl TryFrom<String> for CoverSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How volumes are handed to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// One book per volume, titled `<name> <N>`.
    PerVolume,
    /// One book containing every volume, titled `<name>`.
    Omnibus,
}

/// Settings forwarded to `kcc-c2e`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KccConfig {
    pub binary: PathBuf,
    pub profile: String,
    pub manga_style: bool,
    pub batch_split: u8,
    pub extra_args: Vec<String>,
}

impl Default for KccConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kcc-c2e"),
            profile: "K11".to_string(),
            manga_style: true,
            batch_split: 0,
            extra_args: Vec::new(),
        }
    }
}

/// Remote cover catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base: String,
    pub uploads_base: String,
    pub timeout_secs: u64,
    pub cache: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.mangadex.org".to_string(),
            uploads_base: "https://uploads.mangadex.org".to_string(),
            timeout_secs: 30,
            cache: true,
        }
    }
}

/// Effective configuration after merging defaults, file, environment and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Komikku data directory; `None` means the platform default.
    pub data_dir: Option<PathBuf>,
    /// Destination parent, relative to `$HOME` unless absolute.
    pub destination: PathBuf,
    pub format: OutputFormat,
    pub cover: CoverSource,
    /// `None` lets the cover source decide (local cover implies omnibus).
    pub omnibus: Option<bool>,
    pub kcc: KccConfig,
    pub catalog: CatalogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            destination: PathBuf::from(DEFAULT_DESTINATION),
            format: OutputFormat::default(),
            cover: CoverSource::default(),
            omnibus: None,
            kcc: KccConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    pub fn conversion_mode(&self) -> ConversionMode {
        let omnibus = self.omnibus.unwrap_or(self.cover == CoverSource::Local);
        if omnibus {
            ConversionMode::Omnibus
        } else {
            ConversionMode::PerVolume
        }
    }
}
