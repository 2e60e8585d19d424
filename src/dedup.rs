//! Duplicate filtering over a time-ordered coordinate stream
//!
//! Repeated rows in the source table come from retried writes, so they always
//! share one exact timestamp. The window therefore only remembers the readings
//! of the current timestamp group and starts over whenever the timestamp
//! changes, which keeps memory bounded by the size of one group no matter how
//! many rows are scanned.

use crate::error::Rejection;
use crate::types::Coordinate;
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// Identity of a reading for duplicate detection.
///
/// Coordinates are compared by bit pattern so the key can be hashed; `-0.0`
/// is folded into `0.0` to keep the usual float equality for zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub mobile_id: i64,
    pub timestamp: NaiveDateTime,
    latitude_bits: u64,
    longitude_bits: u64,
}

impl WindowKey {
    pub fn new(mobile_id: i64, timestamp: NaiveDateTime, latitude: f64, longitude: f64) -> Self {
        Self {
            mobile_id,
            timestamp,
            latitude_bits: float_key(latitude),
            longitude_bits: float_key(longitude),
        }
    }

    /// Key for `coordinate`, or `None` when it has no timestamp
    pub fn for_coordinate(coordinate: &Coordinate) -> Option<Self> {
        coordinate.timestamp.map(|timestamp| {
            Self::new(
                coordinate.mobile_id,
                timestamp,
                coordinate.latitude,
                coordinate.longitude,
            )
        })
    }

    pub fn latitude(&self) -> f64 {
        f64::from_bits(self.latitude_bits)
    }

    pub fn longitude(&self) -> f64 {
        f64::from_bits(self.longitude_bits)
    }
}

fn float_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Readings seen in the current timestamp group
#[derive(Debug, Default)]
pub struct DedupWindow {
    group: Option<NaiveDateTime>,
    seen: HashSet<WindowKey>,
}

impl DedupWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `coordinate` should be exported.
    ///
    /// Records without a timestamp are rejected and leave the window untouched.
    /// A record from a new timestamp group clears the window first.
    pub fn admit(&mut self, coordinate: &Coordinate) -> Result<(), Rejection> {
        let key = WindowKey::for_coordinate(coordinate).ok_or(Rejection::InvalidTimestamp)?;

        if self.group != Some(key.timestamp) {
            self.seen.clear();
            self.group = Some(key.timestamp);
        }

        if self.seen.insert(key) {
            Ok(())
        } else {
            Err(Rejection::Duplicate)
        }
    }

    /// Timestamp shared by every entry in the window
    pub fn group(&self) -> Option<NaiveDateTime> {
        self.group
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
