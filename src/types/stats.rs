/// Running counters of an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Records written to the sink
    pub processed: u64,
    /// Records dropped as exact repeats within a timestamp group
    pub duplicates: u64,
    /// Records dropped for a missing timestamp
    pub invalid: u64,
    /// Batches fetched from the data source
    pub batches: u64,
}

impl ExportStats {
    /// Duplicates as a percentage of processed records.
    ///
    /// `None` until at least one record has been processed.
    pub fn duplicate_rate(&self) -> Option<f64> {
        if self.processed == 0 {
            return None;
        }
        Some(self.duplicates as f64 / self.processed as f64 * 100.0)
    }

    /// Progress line reported after each batch
    pub fn progress_line(&self) -> String {
        format!(
            "Total dupes: {} / Total processed: {} / Dupe rate: {:.2}%",
            self.duplicates,
            self.processed,
            self.duplicate_rate().unwrap_or(0.0)
        )
    }
}
