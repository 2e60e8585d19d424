use chrono::NaiveDateTime;
use std::fmt;

/// Scan progress marker: every row at or before this instant has been handled.
///
/// Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(NaiveDateTime);

impl Watermark {
    pub fn new(start: NaiveDateTime) -> Self {
        Self(start)
    }

    pub fn get(&self) -> NaiveDateTime {
        self.0
    }

    /// Move to `timestamp` if it is later than the current position.
    ///
    /// Returns whether the watermark moved.
    pub fn advance(&mut self, timestamp: NaiveDateTime) -> bool {
        if timestamp > self.0 {
            self.0 = timestamp;
            true
        } else {
            false
        }
    }

    /// Loop condition of the scan: still short of `upper`
    pub fn is_before(&self, upper: NaiveDateTime) -> bool {
        self.0 < upper
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, s)
            .unwrap()
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut watermark = Watermark::new(at(5));
        assert!(!watermark.advance(at(3)));
        assert_eq!(watermark.get(), at(5));
        assert!(!watermark.advance(at(5)));
        assert!(watermark.advance(at(9)));
        assert_eq!(watermark.get(), at(9));
    }

    #[test]
    fn test_is_before() {
        let watermark = Watermark::new(at(10));
        assert!(watermark.is_before(at(11)));
        assert!(!watermark.is_before(at(10)));
        assert!(!watermark.is_before(at(2)));
    }
}
