//! Export driver
//!
//! Ties the pieces together for one survey: resolve the survey and its device
//! identifiers, discover the timestamp range, then page through the
//! coordinates after a watermark, enriching, deduplicating and writing each
//! row until the watermark reaches the last timestamp.

use crate::config::ExportConfig;
use crate::dedup::DedupWindow;
use crate::error::{ExportError, Rejection};
use crate::resolver::IdentifierMap;
use crate::scanner::{PaginatedScanner, TimestampRange};
use crate::sink::CoordinateSink;
use crate::source::CoordinateSource;
use crate::types::{Coordinate, ExportStats, Watermark};
use crate::Result;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// File name of a survey's export
pub fn output_file_name(survey_name: &str) -> String {
    format!("{survey_name}-coordinates_filtered.csv")
}

/// Full output path of a survey's export inside `output_dir`
pub fn output_path(output_dir: &Path, survey_name: &str) -> PathBuf {
    output_dir.join(output_file_name(survey_name))
}

/// Outcome of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub survey_id: i64,
    /// `None` when the survey had no timestamped coordinates
    pub range: Option<TimestampRange>,
    pub stats: ExportStats,
    /// Timestamp of the last admitted record, or the range start if none was
    pub final_watermark: Option<NaiveDateTime>,
}

/// A survey export whose survey id and identifier map are resolved.
///
/// Nothing is written until [`SurveyExport::run`], so a failed lookup leaves no
/// output behind.
pub struct SurveyExport<'a, S: CoordinateSource + ?Sized> {
    source: &'a S,
    survey_name: String,
    survey_id: i64,
    identifiers: IdentifierMap,
    batch_size: usize,
    timestamp_cutoff: Option<NaiveDateTime>,
}

impl<'a, S: CoordinateSource + ?Sized> SurveyExport<'a, S> {
    /// Look up the survey and fetch its device identifiers
    pub fn prepare(source: &'a S, survey_name: &str, config: &ExportConfig) -> Result<Self> {
        info!("Fetching survey ID for {survey_name}...");
        let survey_id = source.resolve_survey_id(survey_name)?;
        debug!("Survey {survey_name} has ID {survey_id}");

        let identifiers = IdentifierMap::resolve(source, survey_id)?;

        Ok(Self {
            source,
            survey_name: survey_name.to_string(),
            survey_id,
            identifiers,
            batch_size: config.batch_size,
            timestamp_cutoff: config.timestamp_cutoff,
        })
    }

    pub fn survey_id(&self) -> i64 {
        self.survey_id
    }

    pub fn survey_name(&self) -> &str {
        &self.survey_name
    }

    /// Scan the survey and write every admitted coordinate to `sink`.
    ///
    /// The sink is flushed after every batch and finished at the end. A failure
    /// part-way leaves already written rows in place.
    pub fn run<K: CoordinateSink + ?Sized>(mut self, sink: &mut K) -> Result<ExportReport> {
        info!("Dumping coordinates for {} to .csv...", self.survey_name);
        let scanner = PaginatedScanner::new(
            self.source,
            self.survey_id,
            self.batch_size,
            self.timestamp_cutoff,
        );
        let mut stats = ExportStats::default();

        let range = match scanner.discover_range()? {
            Some(range) => range,
            None => {
                sink.finish()?;
                return Ok(ExportReport {
                    survey_id: self.survey_id,
                    range: None,
                    stats,
                    final_watermark: None,
                });
            }
        };

        let mut watermark = Watermark::new(range.first);
        let mut window = DedupWindow::new();

        while watermark.is_before(range.last) {
            let mut batch = scanner.next_batch(&watermark)?;
            stats.batches += 1;
            if batch.is_empty() {
                info!("No coordinates after {watermark}, scan complete");
                break;
            }

            if batch.len() >= scanner.batch_size() {
                let deferred = defer_boundary_group(&mut batch);
                if deferred > 0 {
                    debug!("Deferring {deferred} coordinates at the batch boundary");
                } else {
                    warn!(
                        "Batch of {} coordinates shares a single timestamp; rows at that instant past the batch size are skipped",
                        batch.len()
                    );
                }
            }

            let start = watermark;
            for coordinate in batch {
                self.process(coordinate, &mut window, &mut watermark, &mut stats, sink)?;
            }
            sink.flush()?;
            info!("{}", stats.progress_line());

            // The next fetch would return the same rows again
            if watermark == start {
                return Err(ExportError::Scan(format!(
                    "batch after {start} contained no admissible coordinates, scan cannot advance"
                )));
            }
        }

        sink.finish()?;
        Ok(ExportReport {
            survey_id: self.survey_id,
            range: Some(range),
            stats,
            final_watermark: Some(watermark.get()),
        })
    }

    fn process<K: CoordinateSink + ?Sized>(
        &mut self,
        mut coordinate: Coordinate,
        window: &mut DedupWindow,
        watermark: &mut Watermark,
        stats: &mut ExportStats,
        sink: &mut K,
    ) -> Result<()> {
        self.identifiers.enrich(&mut coordinate);

        match window.admit(&coordinate) {
            Ok(()) => {
                sink.write(&coordinate)?;
                if let Some(ts) = coordinate.timestamp {
                    watermark.advance(ts);
                }
                stats.processed += 1;
            }
            Err(Rejection::Duplicate) => {
                debug!("Skipping duplicate coordinate {}", coordinate.id);
                stats.duplicates += 1;
            }
            Err(Rejection::InvalidTimestamp) => {
                debug!("Skipping coordinate {} without timestamp", coordinate.id);
                stats.invalid += 1;
            }
        }
        Ok(())
    }
}

/// Drop the trailing rows of a full batch that share its last timestamp.
///
/// The next fetch starts strictly after the watermark, so rows of that instant
/// cut off by the batch limit would otherwise never be read. Deferred rows are
/// fetched again with the rest of their group. Nothing is deferred when the
/// whole batch is one timestamp group. Returns the number of rows dropped.
pub fn defer_boundary_group(batch: &mut Vec<Coordinate>) -> usize {
    let last = match batch.last() {
        Some(coordinate) => coordinate.timestamp,
        None => return 0,
    };
    match batch.iter().rposition(|c| c.timestamp != last) {
        Some(keep) => {
            let deferred = batch.len() - (keep + 1);
            batch.truncate(keep + 1);
            deferred
        }
        None => 0,
    }
}
