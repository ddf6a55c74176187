//! Volume partitioning by chapter stops.
//!
//! A stop is the number of the last chapter in a volume. Volume `i` holds the
//! chapters with `stops[i-1] < num <= stops[i]`; volume 1 has no lower bound.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{format_number, Chapter};

pub mod stops;

pub use stops::{parse_stops, StopCollector, StopDecision};

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("At least one volume stop is required")]
    NoStops,

    #[error("Invalid volume stop '{0}'")]
    Invalid(String),

    #[error("Volume stop {0} is not a finite number")]
    NotFinite(f64),

    #[error("Volume stops must increase: {stop} does not come after {previous}")]
    NotIncreasing { previous: String, stop: String },

    #[error("Last volume stop {stop} leaves chapter {last_chapter} without a volume")]
    DoesNotCover { stop: String, last_chapter: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    /// 1-based volume number.
    pub number: usize,
    /// Exclusive lower bound, `None` for the first volume.
    pub start: Option<f64>,
    /// Inclusive upper bound.
    pub stop: f64,
    pub chapters: Vec<Chapter>,
}

impl Volume {
    pub fn dir_name(&self) -> String {
        format!("Volume {}", self.number)
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn contains(&self, num: f64) -> bool {
        self.start.map_or(true, |start| start < num) && num <= self.stop
    }
}

/// Check that stops are finite, strictly increasing and reach `last_chapter`.
pub fn validate_stops(stops: &[f64], last_chapter: Option<f64>) -> Result<(), VolumeError> {
    let Some(&final_stop) = stops.last() else {
        return Err(VolumeError::NoStops);
    };

    for &stop in stops {
        if !stop.is_finite() {
            return Err(VolumeError::NotFinite(stop));
        }
    }

    for pair in stops.windows(2) {
        if pair[1] <= pair[0] {
            return Err(VolumeError::NotIncreasing {
                previous: format_number(pair[0]),
                stop: format_number(pair[1]),
            });
        }
    }

    if let Some(last) = last_chapter {
        if final_stop < last {
            return Err(VolumeError::DoesNotCover {
                stop: format_number(final_stop),
                last_chapter: format_number(last),
            });
        }
    }

    Ok(())
}

/// Split chapters into volumes at the given stops.
///
/// Every chapter lands in exactly one volume. Volumes whose range holds no
/// chapter are kept (empty) so numbering follows the stops.
pub fn partition(chapters: &[Chapter], stops: &[f64]) -> Result<Vec<Volume>, VolumeError> {
    let mut sorted: Vec<Chapter> = chapters.to_vec();
    sorted.sort_by(|a, b| a.num.total_cmp(&b.num));

    validate_stops(stops, sorted.last().map(|c| c.num))?;

    let mut volumes: Vec<Volume> = Vec::with_capacity(stops.len());
    let mut remaining = sorted.into_iter().peekable();
    let mut start = None;

    for (idx, &stop) in stops.iter().enumerate() {
        let mut volume = Volume { number: idx + 1, start, stop, chapters: Vec::new() };
        while let Some(chapter) = remaining.next_if(|c| c.num <= stop) {
            volume.chapters.push(chapter);
        }
        tracing::debug!(
            "Volume {} ({} < num <= {}): {} chapter(s)",
            volume.number,
            start.map(format_number).unwrap_or_else(|| "-inf".to_string()),
            format_number(stop),
            volume.chapters.len()
        );
        volumes.push(volume);
        start = Some(stop);
    }

    Ok(volumes)
}
