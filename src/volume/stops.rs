//! Parsing and interactive collection of volume stops.

use super::VolumeError;
use crate::domain::format_number;

/// Parse stops separated by commas and/or whitespace, e.g. `"10, 20.5 30"`.
pub fn parse_stops(input: &str) -> Result<Vec<f64>, VolumeError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let stop: f64 = part.parse().map_err(|_| VolumeError::Invalid(part.to_string()))?;
            if stop.is_finite() {
                Ok(stop)
            } else {
                Err(VolumeError::NotFinite(stop))
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// The last chapter is not covered yet; ask for another stop.
    NeedMore,
    /// Every chapter now has a volume.
    Complete,
}

/// Accumulates stops one prompt at a time until the last chapter is covered.
#[derive(Debug, Clone)]
pub struct StopCollector {
    last_chapter: f64,
    stops: Vec<f64>,
}

impl StopCollector {
    pub fn new(last_chapter: f64) -> Self {
        Self { last_chapter, stops: Vec::new() }
    }

    /// Number of the volume the next stop closes.
    pub fn next_volume(&self) -> usize {
        self.stops.len() + 1
    }

    pub fn prompt(&self) -> String {
        format!("Volume {} stops at", self.next_volume())
    }

    /// Suggested answer: the last downloaded chapter.
    pub fn default_stop(&self) -> f64 {
        self.last_chapter
    }

    /// Check a candidate without recording it.
    pub fn check(&self, stop: f64) -> Result<(), VolumeError> {
        if !stop.is_finite() {
            return Err(VolumeError::NotFinite(stop));
        }
        if let Some(&previous) = self.stops.last() {
            if stop <= previous {
                return Err(VolumeError::NotIncreasing {
                    previous: format_number(previous),
                    stop: format_number(stop),
                });
            }
        }
        Ok(())
    }

    pub fn offer(&mut self, stop: f64) -> Result<StopDecision, VolumeError> {
        self.check(stop)?;
        self.stops.push(stop);
        Ok(self.decision())
    }

    pub fn decision(&self) -> StopDecision {
        match self.stops.last() {
            Some(&stop) if stop >= self.last_chapter => StopDecision::Complete,
            _ => StopDecision::NeedMore,
        }
    }

    pub fn stops(&self) -> &[f64] {
        &self.stops
    }

    pub fn into_stops(self) -> Vec<f64> {
        self.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stops_accepts_commas_and_spaces() {
        assert_eq!(parse_stops("10, 20.5 30").expect("parse"), vec![10.0, 20.5, 30.0]);
        assert_eq!(parse_stops("  7 ").expect("parse"), vec![7.0]);
        assert!(parse_stops("").expect("parse").is_empty());
    }

    #[test]
    fn parse_stops_rejects_garbage() {
        assert_eq!(parse_stops("10, ten"), Err(VolumeError::Invalid("ten".to_string())));
        assert!(matches!(parse_stops("inf"), Err(VolumeError::NotFinite(_))));
    }

    #[test]
    fn collector_asks_until_last_chapter_is_covered() {
        let mut collector = StopCollector::new(24.0);
        assert_eq!(collector.prompt(), "Volume 1 stops at");
        assert_eq!(collector.default_stop(), 24.0);
        assert_eq!(collector.offer(8.0), Ok(StopDecision::NeedMore));
        assert_eq!(collector.prompt(), "Volume 2 stops at");
        assert_eq!(collector.offer(16.5), Ok(StopDecision::NeedMore));
        assert_eq!(collector.offer(24.0), Ok(StopDecision::Complete));
        assert_eq!(collector.into_stops(), vec![8.0, 16.5, 24.0]);
    }

    #[test]
    fn collector_rejects_non_increasing_stop_without_recording_it() {
        let mut collector = StopCollector::new(10.0);
        collector.offer(5.0).expect("first stop");
        assert!(matches!(collector.offer(5.0), Err(VolumeError::NotIncreasing { .. })));
        assert!(collector.offer(3.0).is_err());
        assert_eq!(collector.stops(), &[5.0]);
        assert_eq!(collector.offer(12.0), Ok(StopDecision::Complete));
    }
}
