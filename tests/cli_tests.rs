//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    root: TempDir,
}

impl Fixture {
    /// A Komikku data dir with one fully downloaded manga and a cover.
    fn new() -> Self {
        let root = TempDir::new().expect("temp root");
        let data = root.path().join("komikku");
        fs::create_dir_all(&data).expect("mkdir data");

        let conn = Connection::open(data.join("komikku.db")).expect("open db");
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
                (2, 'mangasee', 'Dorohedoro');
            INSERT INTO chapters (manga_id, slug, title, num, downloaded) VALUES
                (1, 'c1', 'Awakening', 1, 1),
                (1, 'c2', NULL, 2, 1),
                (1, 'c3', NULL, 3, 1),
                (1, 'c4', NULL, 4, 0);
            ",
        )
        .expect("seed db");

        let manga_dir = data.join("mangadex").join("Blue Period");
        for (slug, pages) in [("c1", &["2.png", "1.png"][..]), ("c2", &["1.png"]), ("c3", &["1.jpg"])]
        {
            let dir = manga_dir.join(slug);
            fs::create_dir_all(&dir).expect("mkdir chapter");
            for page in pages {
                fs::write(dir.join(page), format!("{slug}/{page}")).expect("write page");
            }
        }
        fs::write(manga_dir.join("cover.jpg"), "cover").expect("write cover");

        Self { root }
    }

    fn data_dir(&self) -> PathBuf {
        self.root.path().join("komikku")
    }

    fn dest(&self) -> PathBuf {
        self.root.path().join("Manga")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("manga-volumes"));
        cmd.env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env("XDG_CACHE_HOME", self.root.path().join("cache"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn organize(&self, extra: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["organize", "--data-dir"])
            .arg(self.data_dir())
            .arg("--destination")
            .arg(self.dest())
            .args(extra);
        cmd
    }
}

fn files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("manga-volumes"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("manga-volumes"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("manga-volumes"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Bundle downloaded Komikku chapters"))
        .stdout(predicate::str::contains("organize"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_for_bash() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("manga-volumes"));
    cmd.args(["completions", "bash"]);
    cmd.assert().success().stdout(predicate::str::contains("manga-volumes"));
}

#[test]
fn test_list_shows_downloaded_chapter_counts() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("list")
        .arg("--data-dir")
        .arg(fx.data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Blue Period"))
        .stdout(predicate::str::contains("3 downloaded chapter(s)"))
        .stdout(predicate::str::contains("Dorohedoro"));
}

#[test]
fn test_list_json() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["list", "--json", "--data-dir"])
        .arg(fx.data_dir())
        .output()
        .expect("run list");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value[0]["name"], "Blue Period");
    assert_eq!(value[0]["downloaded_chapters"], 3);
    assert_eq!(value[1]["server_id"], "mangasee");
}

#[test]
fn test_missing_database_is_reported() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["list", "--data-dir"])
        .arg(fx.root.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Komikku database not found"));
}

#[test]
fn test_organize_requires_manga_when_not_interactive() {
    let fx = Fixture::new();
    fx.organize(&["--stops", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--manga is required in non-interactive mode"));
}

#[test]
fn test_organize_requires_stops_when_not_interactive() {
    let fx = Fixture::new();
    fx.organize(&["--manga", "Blue Period"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--stops is required"));
}

#[test]
fn test_organize_rejects_stops_that_leave_chapters_out() {
    let fx = Fixture::new();
    fx.organize(&["--manga", "Blue Period", "--stops", "1,2", "--skip-convert"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("leaves chapter 3 without a volume"));
    assert!(!fx.dest().join("Blue Period").exists());
}

#[test]
fn test_organize_builds_volume_layout() {
    let fx = Fixture::new();
    fx.organize(&["--manga", "blue period", "--stops", "2 3", "--cover", "local", "--skip-convert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Organized 2 volume(s), 5 page(s)"));

    let dest = fx.dest().join("Blue Period");
    assert_eq!(files(&dest), vec!["Volume 1", "Volume 2", "manifest.json"]);

    let first = dest.join("Volume 1");
    assert_eq!(files(&first), vec!["Awakening", "Chapter 2"]);
    assert_eq!(files(&first.join("Awakening")), vec!["0.jpg", "1.png", "2.png"]);
    assert_eq!(fs::read_to_string(first.join("Awakening").join("0.jpg")).expect("cover"), "cover");
    assert_eq!(fs::read_to_string(first.join("Awakening").join("1.png")).expect("page"), "c1/1.png");
    assert_eq!(files(&first.join("Chapter 2")), vec!["3.png"]);
    assert_eq!(files(&dest.join("Volume 2").join("Chapter 3")), vec!["0.jpg"]);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dest.join("manifest.json")).expect("manifest"))
            .expect("json");
    assert_eq!(manifest["format"], "MOBI");
    assert_eq!(manifest["volumes"][1]["stop"], 3.0);
}

#[test]
fn test_organize_refuses_existing_destination_without_overwrite() {
    let fx = Fixture::new();
    let existing = fx.dest().join("Blue Period");
    fs::create_dir_all(&existing).expect("mkdir");
    fs::write(existing.join("keep.txt"), "x").expect("write");

    fx.organize(&["--manga", "1", "--stops", "3", "--skip-convert"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Destination already exists"));
    assert!(existing.join("keep.txt").exists());

    fx.organize(&["--manga", "1", "--stops", "3", "--skip-convert", "--overwrite"])
        .assert()
        .success();
    assert!(!existing.join("keep.txt").exists());
    assert!(existing.join("Volume 1").is_dir());
}

#[test]
fn test_organize_reports_missing_converter() {
    let fx = Fixture::new();
    fx.organize(&["--manga", "1", "--stops", "3", "--kcc-path", "no-such-kcc-c2e-binary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Converter 'no-such-kcc-c2e-binary' not found"));
}

#[cfg(unix)]
fn fake_kcc(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("kcc-c2e");
    fs::write(
        &script,
        r#"#!/bin/sh
printf '%s\n' "$*" >> "$(dirname "$0")/kcc.log"
out=""
title=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -t) title="$2"; shift ;;
  esac
  shift
done
touch "$out/$title.mobi"
"#,
    )
    .expect("write fake kcc");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    script
}

#[cfg(unix)]
#[test]
fn test_organize_runs_converter_per_volume() {
    let fx = Fixture::new();
    let kcc = fake_kcc(fx.root.path());

    fx.organize(&["--manga", "Blue Period", "--stops", "1,3", "--kcc-path"])
        .arg(&kcc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Done! Processed volumes saved in"));

    let log = fs::read_to_string(fx.root.path().join("kcc.log")).expect("kcc log");
    let runs: Vec<&str> = log.lines().collect();
    assert_eq!(runs.len(), 2);
    assert!(runs[0].starts_with("-p K11 -m -f MOBI -b 0 -t Blue Period 1 -o "));
    assert!(runs[1].contains("-t Blue Period 2"));
    assert!(runs[1].ends_with("Volume 2"));

    let output = fx.dest().join("Blue Period").join("Output");
    assert_eq!(files(&output), vec!["Blue Period 1.mobi", "Blue Period 2.mobi"]);
}

#[cfg(unix)]
#[test]
fn test_organize_omnibus_converts_once() {
    let fx = Fixture::new();
    let kcc = fake_kcc(fx.root.path());

    fx.organize(&["--manga", "Blue Period", "--stops", "1,3", "--omnibus", "-f", "epub", "--kcc-path"])
        .arg(&kcc)
        .assert()
        .success();

    let log = fs::read_to_string(fx.root.path().join("kcc.log")).expect("kcc log");
    let runs: Vec<&str> = log.lines().collect();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].contains("-f EPUB"));
    assert!(runs[0].contains("-t Blue Period -o"));
    assert!(runs[0].ends_with("Blue Period"));
}
