//! Bounded, time-ordered pagination over a survey's coordinates

use crate::source::CoordinateSource;
use crate::types::{Coordinate, Watermark};
use crate::Result;
use chrono::NaiveDateTime;
use log::info;

/// Rows fetched per query when not configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 500_000;

/// First and last coordinate timestamps of a survey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl TimestampRange {
    /// Whether a scan starting at `first` has anything to walk
    pub fn is_scannable(&self) -> bool {
        self.first < self.last
    }
}

/// Walks a survey's coordinates in batches past a watermark
pub struct PaginatedScanner<'a, S: CoordinateSource + ?Sized> {
    source: &'a S,
    survey_id: i64,
    batch_size: usize,
    cutoff: Option<NaiveDateTime>,
}

impl<'a, S: CoordinateSource + ?Sized> PaginatedScanner<'a, S> {
    pub fn new(
        source: &'a S,
        survey_id: i64,
        batch_size: usize,
        cutoff: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            source,
            survey_id,
            batch_size: batch_size.max(1),
            cutoff,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Bounds of the scan. `None` when the survey has nothing to export.
    pub fn discover_range(&self) -> Result<Option<TimestampRange>> {
        info!("Querying first and last coordinate timestamps for survey...");
        let range = self.source.timestamp_range(self.survey_id, self.cutoff)?;
        match &range {
            Some(range) => info!(
                "First coordinate: {} / Last coordinate: {}",
                range.first, range.last
            ),
            None => info!("Survey {} has no timestamped coordinates", self.survey_id),
        }
        Ok(range)
    }

    /// Next ordered batch after `watermark`; empty once the survey is exhausted
    pub fn next_batch(&self, watermark: &Watermark) -> Result<Vec<Coordinate>> {
        info!("Fetching coordinates since: {watermark}");
        self.source
            .fetch_batch(self.survey_id, watermark.get(), self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemorySource;
    use chrono::NaiveDate;

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, s)
            .unwrap()
    }

    fn source() -> MemorySource {
        MemorySource::new().with_coordinates((1..=5).map(|i| Coordinate {
            id: i,
            survey_id: 9,
            timestamp: Some(at(i as u32)),
            ..Default::default()
        }))
    }

    #[test]
    fn test_range_and_batches() {
        let source = source();
        let scanner = PaginatedScanner::new(&source, 9, 2, None);

        let range = scanner.discover_range().unwrap().unwrap();
        assert_eq!(range, TimestampRange { first: at(1), last: at(5) });
        assert!(range.is_scannable());

        let mut watermark = Watermark::new(range.first);
        let batch = scanner.next_batch(&watermark).unwrap();
        assert_eq!(batch.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);

        watermark.advance(at(3));
        let batch = scanner.next_batch(&watermark).unwrap();
        assert_eq!(batch.iter().map(|c| c.id).collect::<Vec<_>>(), vec![4, 5]);

        watermark.advance(at(5));
        assert!(scanner.next_batch(&watermark).unwrap().is_empty());
    }

    #[test]
    fn test_cutoff_moves_first_timestamp() {
        let source = source();
        let scanner = PaginatedScanner::new(&source, 9, 10, Some(at(3)));
        let range = scanner.discover_range().unwrap().unwrap();
        assert_eq!(range.first, at(4));
        assert_eq!(range.last, at(5));
    }

    #[test]
    fn test_degenerate_range() {
        let range = TimestampRange { first: at(3), last: at(3) };
        assert!(!range.is_scannable());
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let source = source();
        let scanner = PaginatedScanner::new(&source, 9, 0, None);
        assert_eq!(scanner.batch_size(), 1);
    }
}
