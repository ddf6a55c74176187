//! manga-volumes: bundle downloaded Komikku chapters into e-reader volumes
//!
//! Reads the Komikku library, splits a manga's chapters into volumes at
//! user-chosen chapter stops, and converts each volume with Kindle Comic Converter.

use anyhow::Result;

fn main() -> Result<()> {
    manga_volumes::cli::run()
}
