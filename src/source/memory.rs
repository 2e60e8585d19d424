use super::CoordinateSource;
use crate::error::ExportError;
use crate::scanner::TimestampRange;
use crate::types::Coordinate;
use crate::Result;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// In-memory survey tables with the same query semantics as the database
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    surveys: HashMap<String, i64>,
    identifiers: HashMap<i64, HashMap<i64, String>>,
    coordinates: Vec<Coordinate>,
    fail_identifiers: bool,
    fail_batches: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_survey(mut self, name: &str, survey_id: i64) -> Self {
        self.surveys.insert(name.to_string(), survey_id);
        self
    }

    pub fn with_identifier(mut self, survey_id: i64, mobile_id: i64, uuid: &str) -> Self {
        self.identifiers
            .entry(survey_id)
            .or_default()
            .insert(mobile_id, uuid.to_string());
        self
    }

    pub fn with_coordinates(mut self, coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        self.coordinates.extend(coordinates);
        self
    }

    /// Make every identifier lookup fail
    pub fn failing_identifiers(mut self) -> Self {
        self.fail_identifiers = true;
        self
    }

    /// Make every batch fetch fail
    pub fn failing_batches(mut self) -> Self {
        self.fail_batches = true;
        self
    }

    fn survey_timestamps(&self, survey_id: i64) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.coordinates
            .iter()
            .filter(move |c| c.survey_id == survey_id)
            .filter_map(|c| c.timestamp)
    }
}

impl CoordinateSource for MemorySource {
    fn resolve_survey_id(&self, name: &str) -> Result<i64> {
        self.surveys
            .get(name)
            .copied()
            .ok_or_else(|| ExportError::SurveyNotFound(name.to_string()))
    }

    fn timestamp_range(
        &self,
        survey_id: i64,
        cutoff: Option<NaiveDateTime>,
    ) -> Result<Option<TimestampRange>> {
        let first = self
            .survey_timestamps(survey_id)
            .filter(|ts| cutoff.map_or(true, |cutoff| *ts > cutoff))
            .min();
        let last = self.survey_timestamps(survey_id).max();

        Ok(match (first, last) {
            (Some(first), Some(last)) => Some(TimestampRange { first, last }),
            _ => None,
        })
    }

    fn fetch_batch(
        &self,
        survey_id: i64,
        after: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<Coordinate>> {
        if self.fail_batches {
            return Err(ExportError::Scan(format!(
                "batch fetch after {after} failed"
            )));
        }

        let mut batch: Vec<Coordinate> = self
            .coordinates
            .iter()
            .filter(|c| c.survey_id == survey_id)
            .filter(|c| c.timestamp.map_or(false, |ts| ts > after))
            .cloned()
            .collect();
        // Ties broken by row id, as in the database query
        batch.sort_by_key(|c| (c.timestamp, c.id));
        batch.truncate(limit);
        Ok(batch)
    }

    fn resolve_identifiers(&self, survey_id: i64) -> Result<HashMap<i64, String>> {
        if self.fail_identifiers {
            return Err(ExportError::Resolution(format!(
                "identifier lookup for survey {survey_id} failed"
            )));
        }
        Ok(self.identifiers.get(&survey_id).cloned().unwrap_or_default())
    }
}
