use clap::Parser;
use rmdupes::cli::Cli;
use rmdupes::config::ScanConfiguration;
use rmdupes::duplicates::{DuplicateFinder, FinderError};
use rmdupes::error::ExitCode;
use rmdupes::progress::{EventCollector, QuietSink, ScanEvent, ScanEventSink};
use rmdupes::run_with;
use rmdupes::scanner::ScanError;
use rmdupes::signal::ShutdownHandler;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Deletes a file when a given root is entered, then records as usual.
struct RemoveOnStart {
    trigger: PathBuf,
    victim: PathBuf,
    events: EventCollector,
}

impl ScanEventSink for RemoveOnStart {
    fn on_scan_started(&self, root: &Path) {
        if root == self.trigger {
            fs::remove_file(&self.victim).unwrap();
        }
        self.events.on_scan_started(root);
    }

    fn on_scan_progress(&self, files_examined: u64, sets_found: u64) {
        self.events.on_scan_progress(files_examined, sets_found);
    }

    fn on_scan_error(&self, context: Option<&Path>, path: &Path, error: &ScanError) {
        self.events.on_scan_error(context, path, error);
    }

    fn on_scan_completed(&self, files: u64, duplicates: u64, sets: u64, space: u64) {
        self.events.on_scan_completed(files, duplicates, sets, space);
    }
}

/// Requests shutdown on the first progress event.
struct StopOnProgress {
    handler: ShutdownHandler,
    events: EventCollector,
}

impl ScanEventSink for StopOnProgress {
    fn on_scan_started(&self, root: &Path) {
        self.events.on_scan_started(root);
    }

    fn on_scan_progress(&self, files_examined: u64, sets_found: u64) {
        self.handler.request_shutdown();
        self.events.on_scan_progress(files_examined, sets_found);
    }

    fn on_scan_completed(&self, files: u64, duplicates: u64, sets: u64, space: u64) {
        self.events.on_scan_completed(files, duplicates, sets, space);
    }
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn run(args: &[&str]) -> (ExitCode, String) {
    let mut full = vec!["rm-dupes", "-q"];
    full.extend_from_slice(args);
    let cli = Cli::try_parse_from(full).unwrap();
    let mut out = Vec::new();
    let code = run_with(&cli, &ShutdownHandler::new(), &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_end_to_end_counts() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/1.txt"), b"X");
    write(&dir.path().join("b/2.txt"), b"X");
    write(&dir.path().join("c/3.txt"), b"Y");

    let (registry, summary) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&[dir.path().to_path_buf()], &QuietSink)
        .unwrap();

    assert_eq!(registry.set_count(), 1);
    assert_eq!(registry.file_count(), 2);
    assert_eq!(registry.space_occupied(), 1);
    assert_eq!(summary.duplicate_sets, 1);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.space_occupied, 1);
    assert_eq!(
        registry.get(0).unwrap().paths(),
        vec![dir.path().join("a/1.txt"), dir.path().join("b/2.txt")]
    );
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (registry, summary) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&[dir.path().to_path_buf()], &QuietSink)
        .unwrap();

    assert!(registry.is_empty());
    assert_eq!(summary.files_examined, 0);
}

#[test]
fn test_no_recurse_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("top.txt"), b"same");
    write(&dir.path().join("sub/nested.txt"), b"same");

    let config = ScanConfiguration {
        recurse: false,
        ..Default::default()
    };
    let (registry, summary) = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()], &QuietSink)
        .unwrap();

    assert!(registry.is_empty());
    assert_eq!(summary.files_examined, 1);
}

#[test]
fn test_multiple_roots_share_one_registry() {
    let left = tempdir().unwrap();
    let right = tempdir().unwrap();
    write(&left.path().join("one.bin"), b"shared bytes");
    write(&right.path().join("two.bin"), b"shared bytes");

    let roots: Vec<PathBuf> = vec![left.path().to_path_buf(), right.path().to_path_buf()];
    let (registry, _) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&roots, &QuietSink)
        .unwrap();

    assert_eq!(registry.set_count(), 1);
    assert_eq!(registry.file_count(), 2);
}

#[test]
fn test_overlapping_roots_count_each_file_once() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("sub/a"), b"dup");
    write(&dir.path().join("sub/b"), b"dup");

    let roots = vec![dir.path().to_path_buf(), dir.path().join("sub")];
    let (registry, summary) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&roots, &QuietSink)
        .unwrap();

    assert_eq!(summary.files_examined, 2);
    assert_eq!(registry.file_count(), 2);
}

#[test]
fn test_size_filter_excludes_small_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"ab");
    write(&dir.path().join("small2"), b"ab");
    write(&dir.path().join("big1"), b"abcdefgh");
    write(&dir.path().join("big2"), b"abcdefgh");

    let config = ScanConfiguration {
        min_size: 4,
        ..Default::default()
    };
    let (registry, summary) = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()], &QuietSink)
        .unwrap();

    assert_eq!(summary.files_examined, 2);
    assert_eq!(registry.get(0).unwrap().size(), 8);
}

#[test]
fn test_summary_output() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/1.txt"), b"X");
    write(&dir.path().join("b/2.txt"), b"X");
    write(&dir.path().join("c/3.txt"), b"Y");

    let root = dir.path().to_str().unwrap();
    let (code, text) = run(&["-m", root]);

    assert_eq!(code, ExitCode::Success);
    assert!(text.starts_with("Set 1\n"));
    assert!(text.contains("Scan completed:-"));
    assert!(text.contains("Files examined:        3"));
    assert!(text.contains("Duplicate files found: 2"));
    assert!(text.contains("Duplicate sets found:  1"));
    assert!(text.contains("Space occupied:        1 bytes."));
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"one");
    write(&dir.path().join("b"), b"two!");

    let (code, _) = run(&["-m", dir.path().to_str().unwrap()]);
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_json_output() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x"), b"payload");
    write(&dir.path().join("y"), b"payload");

    let (code, text) = run(&["-m", "--json", dir.path().to_str().unwrap()]);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(value["sets"].as_array().unwrap().len(), 1);
    assert_eq!(value["sets"][0]["size"], 7);
    assert_eq!(value["summary"]["duplicate_files"], 2);
    assert_eq!(value["summary"]["exit_code_name"], "RM000");
}

#[test]
fn test_missing_root_is_an_error() {
    let cli = Cli::try_parse_from(["rm-dupes", "-q", "-m", "/no/such/dir/anywhere"]).unwrap();
    let err = run_with(&cli, &ShutdownHandler::new(), &mut Vec::new()).unwrap_err();
    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_relative_root_yields_absolute_paths() {
    let dir = tempfile::Builder::new()
        .prefix("rel-root")
        .tempdir_in(".")
        .unwrap();
    write(&dir.path().join("a"), b"twin");
    write(&dir.path().join("b"), b"twin");

    let relative = PathBuf::from(".").join(dir.path().file_name().unwrap());
    let (registry, _) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&[relative], &QuietSink)
        .unwrap();

    let paths = registry.get(0).unwrap().paths();
    assert_eq!(paths.len(), 2);
    for path in &paths {
        assert!(path.is_absolute(), "{} is relative", path.display());
        assert!(!path.components().any(|c| c == std::path::Component::CurDir));
    }
    assert_eq!(paths[0].file_name().unwrap(), "a");
    assert_eq!(paths[1].file_name().unwrap(), "b");
}

#[test]
fn test_file_vanishing_before_hashing_is_reported() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    write(&first.path().join("a"), b"xy");
    write(&first.path().join("b"), b"xy");
    write(&second.path().join("c"), b"xy");

    let sink = RemoveOnStart {
        trigger: second.path().to_path_buf(),
        victim: first.path().join("b"),
        events: EventCollector::new(),
    };
    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let (registry, summary) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&roots, &sink)
        .unwrap();

    let events = sink.events.events();
    let error_at = events
        .iter()
        .position(|e| matches!(e, ScanEvent::Error { path, .. } if *path == first.path().join("b")))
        .unwrap();
    match &events[error_at] {
        ScanEvent::Error {
            context, message, ..
        } => {
            assert_eq!(context.as_deref(), Some(first.path()));
            assert!(message.contains("not found"), "{}", message);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(events.last(), Some(&ScanEvent::Completed(3, 2, 1, 2)));
    assert!(error_at < events.len() - 1);

    assert_eq!(summary.errors, 1);
    assert_eq!(
        registry.get(0).unwrap().paths(),
        vec![first.path().join("a"), second.path().join("c")]
    );
}

#[test]
fn test_interrupt_during_traversal_discards_results() {
    let dir = tempdir().unwrap();
    for name in ["f0", "f1", "f2", "f3", "f4", "f5"] {
        write(&dir.path().join(name), b"same");
    }

    let handler = ShutdownHandler::new();
    let sink = StopOnProgress {
        handler: handler.clone(),
        events: EventCollector::new(),
    };
    let err = DuplicateFinder::new(ScanConfiguration::default())
        .with_shutdown_flag(handler.get_flag())
        .with_batch_size(2)
        .scan(&[dir.path().to_path_buf()], &sink)
        .unwrap_err();

    assert!(matches!(err, FinderError::Interrupted));
    let events = sink.events.events();
    assert!(events.contains(&ScanEvent::Progress(2, 1)));
    assert!(!events.iter().any(|e| matches!(e, ScanEvent::Completed(..))));
}

#[test]
fn test_set_order_flag_lists_largest_first() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a1"), b"ab");
    write(&dir.path().join("a2"), b"ab");
    for name in ["b1", "b2", "b3"] {
        write(&dir.path().join(name), b"abcdef");
    }
    let root = dir.path().to_str().unwrap();

    let first_member = |text: &str| text.lines().nth(1).unwrap().trim().to_string();

    let (_, discovery) = run(&["-m", root]);
    assert_eq!(first_member(&discovery), dir.path().join("a1").display().to_string());

    let (code, by_space) = run(&["-m", "--set-order", "space", root]);
    assert_eq!(code, ExitCode::Success);
    assert_eq!(first_member(&by_space), dir.path().join("b1").display().to_string());
}
