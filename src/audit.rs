//! Post-export duplicate audit
//!
//! Re-reads an exported CSV and counts rows whose content appears more than
//! once. Useful to check an export, or an older dump made without filtering.

use crate::Result;
use csv::{ByteRecord, ReaderBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;

/// Progress is reported each time another step of this many percent is read
pub const PROGRESS_STEP_PCT: f64 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub uniques: u64,
    /// Every repeated row, in file order
    pub duplicates: Vec<Vec<String>>,
}

impl AuditReport {
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }
}

/// Audit the CSV file at `path`, calling `on_progress` with the percentage of
/// bytes read every [`PROGRESS_STEP_PCT`] percent
pub fn audit_csv_duplicates<F>(path: &Path, on_progress: F) -> Result<AuditReport>
where
    F: FnMut(f64),
{
    let file = File::open(path)?;
    let total_bytes = file.metadata()?.len();
    audit_reader(file, total_bytes, on_progress)
}

/// Audit CSV data from any reader; `total_bytes` scales the progress reports
pub fn audit_reader<R, F>(reader: R, total_bytes: u64, mut on_progress: F) -> Result<AuditReport>
where
    R: Read,
    F: FnMut(f64),
{
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut seen = HashSet::new();
    let mut report = AuditReport::default();
    let mut next_report = 0.0;
    let mut record = ByteRecord::new();

    while reader.read_byte_record(&mut record)? {
        if seen.insert(row_hash(&record)) {
            report.uniques += 1;
        } else {
            report.duplicates.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        if total_bytes > 0 {
            let progress = reader.position().byte() as f64 / total_bytes as f64 * 100.0;
            if progress > next_report {
                on_progress(progress.min(100.0));
                next_report += PROGRESS_STEP_PCT;
            }
        }
    }

    Ok(report)
}

fn row_hash(record: &ByteRecord) -> u64 {
    let mut hasher = DefaultHasher::new();
    for field in record.iter() {
        field.hash(&mut hasher);
    }
    hasher.finish()
}
