//! Read-only access to the survey tables
//!
//! The export only needs four queries from its data store. They are gathered in
//! [`CoordinateSource`] so the scanner and resolver can be driven by Postgres in
//! production and by [`memory::MemorySource`] in tests.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::scanner::TimestampRange;
use crate::types::Coordinate;
use crate::Result;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Blocking query interface over the survey data.
///
/// Every failure is fatal to the export; implementations do not retry.
pub trait CoordinateSource {
    /// Numeric id of the survey called `name`.
    ///
    /// Fails with [`crate::ExportError::SurveyNotFound`] for an unknown name.
    fn resolve_survey_id(&self, name: &str) -> Result<i64>;

    /// Earliest and latest coordinate timestamps of a survey.
    ///
    /// The earliest one only considers timestamps strictly after `cutoff`, when
    /// given. `None` when the survey has no timestamped coordinates.
    fn timestamp_range(
        &self,
        survey_id: i64,
        cutoff: Option<NaiveDateTime>,
    ) -> Result<Option<TimestampRange>>;

    /// Up to `limit` coordinates with a timestamp strictly after `after`, in
    /// ascending timestamp order.
    fn fetch_batch(
        &self,
        survey_id: i64,
        after: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<Coordinate>>;

    /// Every `mobile_id -> uuid` pair registered under the survey, in one fetch
    fn resolve_identifiers(&self, survey_id: i64) -> Result<HashMap<i64, String>>;
}
