//! Survey Coordinates Export Library
//!
//! Streams the GPS coordinates of one survey out of the survey database into a
//! CSV file in a single pass. Rows are read in bounded, time-ordered batches,
//! enriched with the device uuid, and exact repeats within one timestamp are
//! dropped, so memory stays flat however large the coordinates table is.
//!
//! # Features
//!
//! - **`postgres`** (default): Postgres data source built on `sqlx`
//! - **`cli`** (default): Build the `coords_export` and `coords_audit` binaries
//!
//! # Quick Start
//!
//! Export a survey to `<survey>-coordinates_filtered.csv`:
//! ```rust,no_run
//! use coords_export::{output_path, CsvSink, ExportConfig, PgCoordinateSource, SurveyExport};
//!
//! let config = ExportConfig::from_env().unwrap();
//! let source = PgCoordinateSource::connect(&config).unwrap();
//! let export = SurveyExport::prepare(&source, "montreal-2018", &config).unwrap();
//! let mut sink = CsvSink::create(&output_path(&config.output_dir, "montreal-2018")).unwrap();
//! let report = export.run(&mut sink).unwrap();
//! println!("{}", report.stats.progress_line());
//! ```
//!
//! Drive the same pipeline from memory:
//! ```rust
//! use coords_export::{Coordinate, CsvSink, ExportConfig, MemorySource, SurveyExport};
//!
//! let source = MemorySource::new().with_survey("demo", 1);
//! let export = SurveyExport::prepare(&source, "demo", &ExportConfig::default()).unwrap();
//! let mut sink = CsvSink::new(Vec::new()).unwrap();
//! let report = export.run(&mut sink).unwrap();
//! assert_eq!(report.stats.processed, 0);
//! ```
//!
//! # Public API
//!
//! ## Pipeline
//! - [`SurveyExport`] - Resolve a survey, then scan, filter and write it
//! - [`PaginatedScanner`] - Timestamp range discovery and batch paging
//! - [`DedupWindow`] - Per-timestamp duplicate filter
//! - [`IdentifierMap`] - `mobile_id -> uuid` enrichment
//!
//! ## Data Sources and Sinks
//! - [`CoordinateSource`] - Query interface over the survey tables
//! - [`PgCoordinateSource`] - Postgres implementation
//! - [`MemorySource`] - In-memory implementation
//! - [`CsvSink`] - CSV output
//!
//! ## Tools
//! - [`audit_csv_duplicates`] - Count repeated rows in an exported CSV

pub mod audit;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod resolver;
pub mod scanner;
pub mod sink;
pub mod source;
pub mod types;

pub use audit::*;
pub use config::*;
pub use dedup::*;
pub use error::*;
pub use export::*;
pub use resolver::*;
pub use scanner::*;
pub use sink::*;
pub use source::memory::MemorySource;
#[cfg(feature = "postgres")]
pub use source::postgres::PgCoordinateSource;
pub use source::CoordinateSource;
pub use types::*;
