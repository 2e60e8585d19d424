use chrono::{NaiveDate, NaiveDateTime};
use coords_export::{
    audit_csv_duplicates, output_path, Coordinate, CsvSink, ExportConfig, MemorySource,
    SurveyExport, CSV_HEADERS,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Integration tests for CSV output validation
/// These tests read exported files back and check their layout and content

fn at(s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 6, 15)
        .unwrap()
        .and_hms_opt(8, 30, s)
        .unwrap()
}

fn sample_source() -> MemorySource {
    let mut rows = Vec::new();
    for (i, second) in [1u32, 1, 2, 3, 3, 4].iter().enumerate() {
        rows.push(Coordinate {
            id: i as i64,
            survey_id: 9,
            mobile_id: 1 + (i as i64 % 2),
            latitude: 45.5,
            longitude: -73.6,
            altitude: if i == 2 { None } else { Some(30.25) },
            speed: 2.5,
            direction: Some(180.0),
            h_accuracy: 4.0,
            v_accuracy: 6.0,
            acceleration_x: 0.01,
            acceleration_y: -0.02,
            acceleration_z: 9.81,
            mode_detected: Some(3),
            point_type: if i == 4 { None } else { Some(1) },
            timestamp: Some(at(*second)),
            ..Default::default()
        });
    }
    // Range start, never fetched
    rows.push(Coordinate {
        id: 100,
        survey_id: 9,
        mobile_id: 1,
        timestamp: Some(at(0)),
        ..Default::default()
    });

    MemorySource::new()
        .with_survey("plateau", 9)
        .with_identifier(9, 1, "3f2a9c1e-0001")
        .with_identifier(9, 2, "3f2a9c1e-0002")
        .with_coordinates(rows)
}

fn export_sample(dir: &TempDir) -> PathBuf {
    let source = sample_source();
    let config = ExportConfig {
        batch_size: 4,
        timestamp_cutoff: None,
        ..Default::default()
    };
    let export = SurveyExport::prepare(&source, "plateau", &config).expect("Failed to prepare");
    let path = output_path(dir.path(), "plateau");
    let mut sink = CsvSink::create(&path).expect("Failed to create CSV");
    export.run(&mut sink).expect("Export failed");
    path
}

#[test]
fn test_csv_header_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = export_sample(&temp_dir);

    let mut reader = csv::Reader::from_path(&csv_path).expect("Failed to open CSV");
    let headers = reader.headers().expect("Missing header row");
    assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADERS.to_vec());
    assert_eq!(headers.len(), 14);
}

#[test]
fn test_csv_field_count_consistency() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = export_sample(&temp_dir);
    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read generated CSV file");

    let lines: Vec<&str> = csv_content.lines().collect();
    assert!(lines.len() > 1, "CSV should have header and data rows");

    let expected_fields = lines[0].split(',').count();
    for (line_num, line) in lines.iter().enumerate() {
        let field_count = line.split(',').count();
        assert_eq!(
            field_count,
            expected_fields,
            "Line {} has {} fields, expected {}",
            line_num + 1,
            field_count,
            expected_fields
        );
    }
}

#[test]
fn test_csv_values_by_column() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = export_sample(&temp_dir);

    let mut reader = csv::Reader::from_path(&csv_path).expect("Failed to open CSV");
    let headers = reader.headers().expect("Missing header row").clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("Missing column {name}"))
    };

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("Malformed CSV row");

    // Six source rows at four instants; none are exact repeats
    assert_eq!(records.len(), 6);

    let first = &records[0];
    assert_eq!(&first[column("uuid")], "3f2a9c1e-0001");
    assert_eq!(&first[column("latitude")], "45.5");
    assert_eq!(&first[column("longitude")], "-73.6");
    assert_eq!(&first[column("altitude")], "30.25");
    assert_eq!(&first[column("acceleration_z")], "9.81");
    assert_eq!(&first[column("mode_detected")], "3");
    assert_eq!(&first[column("timestamp")], "2021-06-15T08:30:01");

    // Missing optional values are empty fields
    assert_eq!(&records[2][column("altitude")], "");
    assert_eq!(&records[4][column("point_type")], "");

    let timestamps: Vec<&str> = records.iter().map(|r| &r[column("timestamp")]).collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted, "rows should be in timestamp order");
    assert!(!timestamps.contains(&"2021-06-15T08:30:00"));
}

#[test]
fn test_audit_of_filtered_export_finds_no_duplicates() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = export_sample(&temp_dir);

    let report = audit_csv_duplicates(&csv_path, |_| {}).expect("Audit failed");
    assert_eq!(report.uniques, 6);
    assert_eq!(report.duplicate_count(), 0);
}

#[test]
fn test_audit_of_unfiltered_dump() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = temp_dir.path().join("dump.csv");
    let mut content = CSV_HEADERS.join(",");
    content.push('\n');
    for _ in 0..3 {
        content.push_str("u1,45,-73,,1,,5,8,0,0,0,,,2020-01-01T00:00:00\n");
    }
    content.push_str("u2,45,-73,,1,,5,8,0,0,0,,,2020-01-01T00:00:00\n");
    fs::write(&csv_path, content).expect("Failed to write dump");

    let mut progress = Vec::new();
    let report = audit_csv_duplicates(&csv_path, |pct| progress.push(pct)).expect("Audit failed");
    assert_eq!(report.uniques, 2);
    assert_eq!(report.duplicate_count(), 2);
    assert_eq!(report.duplicates[0][0], "u1");
    assert!(!progress.is_empty());
}

#[cfg(feature = "cli")]
#[test]
fn test_audit_binary_output() {
    use std::process::Command;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = temp_dir.path().join("dump.csv");
    fs::write(&csv_path, "uuid,latitude\na,45\na,45\nb,45\n").expect("Failed to write dump");

    let output = Command::new(env!("CARGO_BIN_EXE_coords_audit"))
        .arg(&csv_path)
        .output()
        .expect("Failed to run coords_audit");

    assert!(
        output.status.success(),
        "Audit failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Uniques: 2 / Duplicates: 1"), "{stdout}");
}

#[cfg(feature = "cli")]
#[test]
fn test_audit_binary_missing_file() {
    use std::process::Command;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = Command::new(env!("CARGO_BIN_EXE_coords_audit"))
        .arg(temp_dir.path().join("absent.csv"))
        .output()
        .expect("Failed to run coords_audit");

    assert!(!output.status.success());
}
