use std::fs;

use heist_dda_core::DifficultyLevel;
use heist_dda_system_log::{CsvFolderSink, DdaLog, LogConfig, PersistError, SampleSink};

fn sample_log() -> DdaLog {
    let mut log = DdaLog::new();
    log.record(0.0, DifficultyLevel::new(3));
    log.record(10.0, DifficultyLevel::new(4));
    log.record(41.25, DifficultyLevel::new(3));
    log
}

#[test]
fn existing_file_is_never_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let existing = dir.path().join("DdaValues_0.csv");
    fs::write(&existing, "keep me").expect("seed existing file");

    let mut sink = CsvFolderSink::new(dir.path(), "DdaValues");
    let record = sample_log().flush(&mut sink).expect("flush succeeds");

    assert!(record.location.ends_with("DdaValues_1.csv"), "{}", record.location);
    assert_eq!(record.samples, 3);
    assert_eq!(fs::read_to_string(&existing).expect("read"), "keep me");

    let written = fs::read_to_string(dir.path().join("DdaValues_1.csv")).expect("read export");
    assert_eq!(
        written,
        "Time;Difficulty\n0.00;3.00\n10.00;4.00\n41.25;3.00\n"
    );
}

#[test]
fn repeated_flushes_produce_distinct_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = CsvFolderSink::new(dir.path().join("nested"), "Run");
    let log = sample_log();

    let first = log.flush(&mut sink).expect("first flush");
    let second = log.flush(&mut sink).expect("second flush");

    assert_ne!(first.location, second.location);
    let a = fs::read_to_string(dir.path().join("nested/Run_0.csv")).expect("first file");
    let b = fs::read_to_string(dir.path().join("nested/Run_1.csv")).expect("second file");
    assert_eq!(a, b);
}

#[test]
fn config_resolves_folder_next_to_data_dir() {
    let root = tempfile::tempdir().expect("tempdir");
    let data_dir = root.path().join("Heist_Data");
    let config = LogConfig::default();

    let mut sink = config.sink(&data_dir);
    let record = sink.persist(sample_log().samples()).expect("persist");

    assert!(root.path().join("DdaLogs/DdaValues_0.csv").exists(), "{}", record.location);
}

#[test]
fn unwritable_folder_reports_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-folder");
    fs::write(&blocker, "").expect("create blocking file");

    let mut sink = CsvFolderSink::new(&blocker, "DdaValues");
    let error = sample_log().flush(&mut sink).expect_err("folder is a file");
    assert!(matches!(error, PersistError::CreateFolder { .. }), "{error}");
}
