//! Read-only access to the Komikku library (database and chapter folders).

use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{Chapter, Manga, DATABASE_FILE};

pub mod paths;

pub use paths::default_data_dir;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Komikku database not found at {0}")]
    DatabaseMissing(PathBuf),

    #[error("No manga matches '{0}'")]
    MangaNotFound(String),

    #[error("'{query}' matches several manga: {candidates}")]
    AmbiguousManga { query: String, candidates: String },

    #[error("Failed reading Komikku database: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A manga together with how many of its chapters are on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MangaSummary {
    #[serde(flatten)]
    pub manga: Manga,
    pub downloaded_chapters: usize,
}

pub struct Library {
    data_dir: PathBuf,
    conn: Connection,
}

impl Library {
    /// Open `<data_dir>/komikku.db` read-only.
    pub fn open(data_dir: &Path) -> Result<Self, LibraryError> {
        let db_path = data_dir.join(DATABASE_FILE);
        if !db_path.is_file() {
            return Err(LibraryError::DatabaseMissing(db_path));
        }
        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!("Opened library database {}", db_path.display());
        Ok(Self { data_dir: data_dir.to_path_buf(), conn })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn mangas(&self) -> Result<Vec<Manga>, LibraryError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, server_id, name FROM mangas ORDER BY name COLLATE NOCASE, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Manga { id: row.get(0)?, server_id: row.get(1)?, name: row.get(2)? })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Resolve a user query to one manga.
    ///
    /// Tries, in order: numeric id, exact name (case-insensitive), unique substring.
    pub fn find_manga(&self, query: &str) -> Result<Manga, LibraryError> {
        let query = query.trim();
        let mangas = self.mangas()?;

        if let Ok(id) = query.parse::<i64>() {
            if let Some(manga) = mangas.iter().find(|m| m.id == id) {
                return Ok(manga.clone());
            }
        }

        let needle = query.to_lowercase();
        if let Some(manga) = mangas.iter().find(|m| m.name.to_lowercase() == needle) {
            return Ok(manga.clone());
        }

        let matches: Vec<&Manga> =
            mangas.iter().filter(|m| m.name.to_lowercase().contains(&needle)).collect();
        match matches.as_slice() {
            [] => Err(LibraryError::MangaNotFound(query.to_string())),
            [only] => Ok((*only).clone()),
            many => Err(LibraryError::AmbiguousManga {
                query: query.to_string(),
                candidates: many.iter().map(|m| m.name.as_str()).collect::<Vec<_>>().join(", "),
            }),
        }
    }

    /// Downloaded chapters of `manga`, sorted by chapter number.
    pub fn downloaded_chapters(&self, manga: &Manga) -> Result<Vec<Chapter>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, title, num FROM chapters WHERE manga_id = ?1 AND downloaded = 1 ORDER BY num",
        )?;
        let rows = stmt.query_map(params![manga.id], |row| {
            let slug: String = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            let num: Option<f64> = row.get(2)?;
            Ok((slug, title, num))
        })?;

        let mut chapters = Vec::new();
        for row in rows {
            let (slug, title, num) = row?;
            match num {
                Some(num) if num.is_finite() => chapters.push(Chapter { slug, title, num }),
                _ => tracing::warn!(
                    "Skipping chapter '{}' of '{}': no chapter number",
                    slug,
                    manga.name
                ),
            }
        }
        chapters.sort_by(|a, b| a.num.total_cmp(&b.num));
        Ok(chapters)
    }

    /// Every manga with its downloaded chapter count.
    pub fn summaries(&self) -> Result<Vec<MangaSummary>, LibraryError> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, m.server_id, m.name, COUNT(c.slug)
             FROM mangas m
             LEFT JOIN chapters c ON c.manga_id = m.id AND c.downloaded = 1
             GROUP BY m.id
             ORDER BY m.name COLLATE NOCASE, m.id",
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(3)?;
            Ok(MangaSummary {
                manga: Manga { id: row.get(0)?, server_id: row.get(1)?, name: row.get(2)? },
                downloaded_chapters: count.max(0) as usize,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Folder holding the chapter folders of `manga`.
    pub fn manga_dir(&self, manga: &Manga) -> PathBuf {
        self.data_dir.join(&manga.server_id).join(&manga.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_library(dir: &Path) {
        let conn = Connection::open(dir.join(DATABASE_FILE)).expect("open db");
        conn.execute_batch(
            "
            CREATE TABLE mangas (id INTEGER PRIMARY KEY, server_id TEXT NOT NULL, name TEXT NOT NULL);
            CREATE TABLE chapters (
                id INTEGER PRIMARY KEY,
                manga_id INTEGER NOT NULL,
                slug TEXT NOT NULL,
                title TEXT,
                num REAL,
                downloaded INTEGER NOT NULL DEFAULT 0
            );
            INSERT INTO mangas (id, server_id, name) VALUES
                (1, 'mangadex', 'Blue Period'),
                (2, 'mangadex', 'Blue Lock'),
                (3, 'mangasee', 'Dorohedoro');
            INSERT INTO chapters (manga_id, slug, title, num, downloaded) VALUES
                (1, 'c3', NULL, 3, 1),
                (1, 'c1', 'Awakening', 1, 1),
                (1, 'c2', '', 2, 1),
                (1, 'c2-5', 'Extra', 2.5, 1),
                (1, 'c4', NULL, 4, 0),
                (1, 'special', 'Special', NULL, 1),
                (3, 'd1', NULL, 1, 1);
            ",
        )
        .expect("seed");
    }

    fn library() -> (TempDir, Library) {
        let tmp = TempDir::new().expect("tmp");
        seed_library(tmp.path());
        let lib = Library::open(tmp.path()).expect("open library");
        (tmp, lib)
    }

    #[test]
    fn open_fails_without_database() {
        let tmp = TempDir::new().expect("tmp");
        let err = Library::open(tmp.path()).err().expect("must fail");
        assert!(matches!(err, LibraryError::DatabaseMissing(_)));
    }

    #[test]
    fn downloaded_chapters_are_sorted_and_filtered() {
        let (_tmp, lib) = library();
        let manga = lib.find_manga("Blue Period").expect("manga");
        let chapters = lib.downloaded_chapters(&manga).expect("chapters");
        let slugs: Vec<&str> = chapters.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c1", "c2", "c2-5", "c3"]);
        assert_eq!(chapters[0].title.as_deref(), Some("Awakening"));
        assert_eq!(chapters[3].num, 3.0);
    }

    #[test]
    fn find_manga_by_id_name_and_substring() {
        let (_tmp, lib) = library();
        assert_eq!(lib.find_manga("3").expect("by id").name, "Dorohedoro");
        assert_eq!(lib.find_manga("blue lock").expect("by name").id, 2);
        assert_eq!(lib.find_manga("doro").expect("by substring").id, 3);
    }

    #[test]
    fn find_manga_reports_ambiguity_and_misses() {
        let (_tmp, lib) = library();
        let err = lib.find_manga("blue").expect_err("ambiguous");
        assert!(err.to_string().contains("Blue Lock"));
        assert!(matches!(lib.find_manga("one piece"), Err(LibraryError::MangaNotFound(_))));
    }

    #[test]
    fn summaries_count_downloaded_chapters() {
        let (_tmp, lib) = library();
        let summaries = lib.summaries().expect("summaries");
        let names: Vec<(&str, usize)> =
            summaries.iter().map(|s| (s.manga.name.as_str(), s.downloaded_chapters)).collect();
        assert_eq!(names, vec![("Blue Lock", 0), ("Blue Period", 5), ("Dorohedoro", 1)]);
    }

    #[test]
    fn manga_dir_uses_server_and_name() {
        let (tmp, lib) = library();
        let manga = lib.find_manga("Dorohedoro").expect("manga");
        assert_eq!(lib.manga_dir(&manga), tmp.path().join("mangasee").join("Dorohedoro"));
    }
}
