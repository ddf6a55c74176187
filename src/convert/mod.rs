//! Invocation of the external `kcc-c2e` comic converter.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use walkdir::WalkDir;

use crate::domain::{ConversionMode, KccConfig, OutputFormat};
use crate::organize::OrganizeReport;

const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Converter '{0}' not found; install Kindle Comic Converter or set kcc.binary")]
    NotFound(String),

    #[error("Failed to launch converter '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {code} while building '{title}':\n{stderr}")]
    Failed { title: String, code: String, stderr: String },
}

/// One converter run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    pub title: String,
    pub input: PathBuf,
}

/// Per-volume jobs titled `<name> <N>`, or a single omnibus job over `destination`.
pub fn plan_conversions(
    mode: ConversionMode,
    manga_name: &str,
    destination: &Path,
    report: &OrganizeReport,
) -> Vec<ConversionJob> {
    match mode {
        ConversionMode::Omnibus if !report.volumes.is_empty() => vec![ConversionJob {
            title: manga_name.to_string(),
            input: destination.to_path_buf(),
        }],
        ConversionMode::Omnibus => Vec::new(),
        ConversionMode::PerVolume => report
            .volumes
            .iter()
            .map(|volume| ConversionJob {
                title: format!("{} {}", manga_name, volume.number),
                input: volume.dir.clone(),
            })
            .collect(),
    }
}

pub struct KccCommand<'a> {
    config: &'a KccConfig,
    format: OutputFormat,
    output_dir: PathBuf,
}

impl<'a> KccCommand<'a> {
    pub fn new(config: &'a KccConfig, format: OutputFormat, output_dir: PathBuf) -> Self {
        Self { config, format, output_dir }
    }

    /// Argument vector for one job; never passed through a shell.
    pub fn args(&self, job: &ConversionJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-p".into(), self.config.profile.clone().into()];
        if self.config.manga_style {
            args.push("-m".into());
        }
        args.extend([
            "-f".into(),
            self.format.kcc_name().into(),
            "-b".into(),
            self.config.batch_split.to_string().into(),
            "-t".into(),
            job.title.clone().into(),
            "-o".into(),
            self.output_dir.clone().into_os_string(),
        ]);
        args.extend(self.config.extra_args.iter().map(OsString::from));
        args.push(job.input.clone().into_os_string());
        args
    }

    /// Run the converter and return its stdout.
    pub fn run(&self, job: &ConversionJob) -> Result<String, ConvertError> {
        let binary = self.config.binary.display().to_string();
        tracing::debug!("Running {} {:?}", binary, self.args(job));

        let output = Command::new(&self.config.binary).args(self.args(job)).output().map_err(
            |source| match source.kind() {
                ErrorKind::NotFound => ConvertError::NotFound(binary.clone()),
                _ => ConvertError::Spawn { binary: binary.clone(), source },
            },
        )?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| format!("status {c}"))
                .unwrap_or_else(|| "a signal".to_string());
            return Err(ConvertError::Failed {
                title: job.title.clone(),
                code,
                stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
            });
        }
        for line in stdout.lines() {
            tracing::debug!("kcc: {}", line);
        }
        Ok(stdout)
    }
}

/// Files the converter left in `output_dir`, sorted by path.
pub fn list_outputs(output_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(output_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
