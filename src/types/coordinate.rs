use chrono::NaiveDateTime;

/// Column names of the exported CSV, in output order
pub const CSV_HEADERS: [&str; 14] = [
    "uuid",
    "latitude",
    "longitude",
    "altitude",
    "speed",
    "direction",
    "h_accuracy",
    "v_accuracy",
    "acceleration_x",
    "acceleration_y",
    "acceleration_z",
    "mode_detected",
    "point_type",
    "timestamp",
];

/// Second-precision timestamp layout used in the CSV
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One position/motion sample reported by a mobile device.
///
/// A record without a timestamp is invalid and is never exported.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Coordinate {
    pub id: i64,
    pub survey_id: i64,
    pub mobile_id: i64,
    /// External device identifier, filled in from the identifier map
    #[cfg_attr(feature = "postgres", sqlx(default))]
    pub mobile_uuid: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: f64,
    pub direction: Option<f64>,
    pub h_accuracy: f64,
    pub v_accuracy: f64,
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,
    pub mode_detected: Option<i64>,
    pub point_type: Option<i64>,
    pub timestamp: Option<NaiveDateTime>,
}

impl Coordinate {
    /// Header row matching [`Coordinate::csv_values`]
    pub fn csv_headers() -> &'static [&'static str] {
        &CSV_HEADERS
    }

    /// Field values formatted for the CSV, parallel to [`CSV_HEADERS`]
    pub fn csv_values(&self) -> Vec<String> {
        vec![
            self.mobile_uuid.clone(),
            format_float(self.latitude),
            format_float(self.longitude),
            format_optional_float(self.altitude),
            format_float(self.speed),
            format_optional_float(self.direction),
            format_float(self.h_accuracy),
            format_float(self.v_accuracy),
            format_float(self.acceleration_x),
            format_float(self.acceleration_y),
            format_float(self.acceleration_z),
            format_optional_int(self.mode_detected),
            format_optional_int(self.point_type),
            format_timestamp(self.timestamp),
        ]
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }
}

/// Shortest decimal that parses back to the same `f64`, never in exponent form.
///
/// `45.0` becomes `"45"`, `-73.5` stays `"-73.5"`.
pub fn format_float(value: f64) -> String {
    value.to_string()
}

/// Empty string when absent, otherwise [`format_float`]
pub fn format_optional_float(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}

pub fn format_optional_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `YYYY-MM-DDTHH:MM:SS`, or empty when absent. Sub-second precision is dropped.
pub fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
