//! Device id to external identifier lookup
//!
//! The whole map is fetched once per survey so enriching a row is a single
//! hash lookup instead of a join or a query per device.

use crate::error::ExportError;
use crate::source::CoordinateSource;
use crate::types::Coordinate;
use crate::Result;
use log::{info, warn};
use std::collections::{HashMap, HashSet};

/// Read-only `mobile_id -> uuid` map of one survey
#[derive(Debug, Default)]
pub struct IdentifierMap {
    identifiers: HashMap<i64, String>,
    unresolved: HashSet<i64>,
}

impl IdentifierMap {
    /// Fetch every identifier registered under `survey_id`
    pub fn resolve<S: CoordinateSource + ?Sized>(source: &S, survey_id: i64) -> Result<Self> {
        info!("Creating mobile ID -> uuid lookup...");
        let identifiers = source.resolve_identifiers(survey_id).map_err(|e| match e {
            e @ ExportError::Resolution(_) => e,
            other => ExportError::Resolution(other.to_string()),
        })?;
        info!("Resolved {} device identifiers", identifiers.len());
        Ok(Self::from_map(identifiers))
    }

    pub fn from_map(identifiers: HashMap<i64, String>) -> Self {
        Self {
            identifiers,
            unresolved: HashSet::new(),
        }
    }

    pub fn get(&self, mobile_id: i64) -> Option<&str> {
        self.identifiers.get(&mobile_id).map(String::as_str)
    }

    /// Fill in `coordinate.mobile_uuid`; unknown devices get an empty identifier.
    ///
    /// Each unknown device id is reported once.
    pub fn enrich(&mut self, coordinate: &mut Coordinate) {
        match self.identifiers.get(&coordinate.mobile_id) {
            Some(uuid) => coordinate.mobile_uuid.clone_from(uuid),
            None => {
                coordinate.mobile_uuid.clear();
                if self.unresolved.insert(coordinate.mobile_id) {
                    warn!("No uuid registered for mobile ID {}", coordinate.mobile_id);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Device ids seen during enrichment that had no identifier
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemorySource;

    #[test]
    fn test_resolve_and_enrich() {
        let source = MemorySource::new()
            .with_identifier(3, 10, "uuid-10")
            .with_identifier(3, 11, "uuid-11")
            .with_identifier(4, 12, "other-survey");

        let mut map = IdentifierMap::resolve(&source, 3).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(11), Some("uuid-11"));
        assert_eq!(map.get(12), None);

        let mut coordinate = Coordinate {
            mobile_id: 10,
            ..Default::default()
        };
        map.enrich(&mut coordinate);
        assert_eq!(coordinate.mobile_uuid, "uuid-10");
    }

    #[test]
    fn test_unknown_device_enriches_empty() {
        let mut map = IdentifierMap::from_map(HashMap::from([(1, "a".to_string())]));
        let mut coordinate = Coordinate {
            mobile_id: 99,
            mobile_uuid: "stale".to_string(),
            ..Default::default()
        };
        map.enrich(&mut coordinate);
        assert_eq!(coordinate.mobile_uuid, "");
        map.enrich(&mut coordinate);
        assert_eq!(map.unresolved_count(), 1);
    }

    #[test]
    fn test_fetch_failure_is_resolution_error() {
        let source = MemorySource::new().failing_identifiers();
        let err = IdentifierMap::resolve(&source, 3).unwrap_err();
        assert_eq!(err.kind(), "resolution");
    }
}
