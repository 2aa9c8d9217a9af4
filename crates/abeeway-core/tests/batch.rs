use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use abeeway_core::{BatchError, BatchOutcome, FixedClock, SourceError, decode_file};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn temp_input(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("abeeway_{name}_{unique}.txt"));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn batch_decodes_sample_file() {
    let path = repo_root().join("tests").join("batch").join("uplinks.txt");
    let clock = FixedClock::from_unix_timestamp(1_704_067_200).unwrap();
    let report = decode_file(&path, 18, &clock).unwrap();

    assert_eq!(report.generated_at, "2024-01-01T00:00:00.000Z");
    assert_eq!(report.summary.uplinks_total, 6);
    assert_eq!(report.summary.decoded, 5);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.with_errors, 1);
    assert!(report.has_problems());

    let lines: Vec<_> = report.entries.iter().map(|entry| entry.line).collect();
    assert_eq!(lines, vec![2, 3, 4, 5, 8, 9]);

    let truncated = &report.entries[4];
    assert_eq!(truncated.port, 2);
    match &truncated.outcome {
        BatchOutcome::Failed { payload, failure } => {
            assert_eq!(payload, "0520");
            assert!(failure.contains("payload too short"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let kinds: Vec<_> = report
        .summary
        .by_type
        .iter()
        .map(|entry| (entry.kind.as_str(), entry.count))
        .collect();
    assert_eq!(
        kinds,
        vec![("FRAME PENDING", 1), ("HEARTBEAT", 1), ("POSITION", 3)]
    );
}

#[test]
fn batch_report_serializes_records_inline() {
    let path = temp_input("inline", "00a7\n");
    let clock = FixedClock::from_unix_timestamp(0).unwrap();
    let report = decode_file(&path, 7, &clock).unwrap();
    let _ = fs::remove_file(&path);

    let value = serde_json::to_value(&report).unwrap();
    let entry = &value["entries"][0];
    assert_eq!(entry["line"], 1);
    assert_eq!(entry["port"], 7);
    assert_eq!(entry["record"]["type"], "FRAME PENDING");
    assert_eq!(entry["record"]["debug"]["port"], 7);
    assert_eq!(value["summary"]["by_type"][0]["type"], "FRAME PENDING");
}

#[test]
fn batch_aborts_on_malformed_line() {
    let path = temp_input("malformed", "00a7\nnot-hex\n");
    let clock = FixedClock::from_unix_timestamp(0).unwrap();
    let err = decode_file(&path, 1, &clock).unwrap_err();
    let _ = fs::remove_file(&path);

    assert!(matches!(
        err,
        BatchError::Source(SourceError::InvalidLine { line: 2, .. })
    ));
}

#[test]
fn batch_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("abeeway_missing_input_does_not_exist.txt");
    let clock = FixedClock::from_unix_timestamp(0).unwrap();
    let err = decode_file(&path, 1, &clock).unwrap_err();
    assert!(matches!(err, BatchError::Source(SourceError::Io(_))));
}
