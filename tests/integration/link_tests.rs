#![cfg(unix)]

use clap::Parser;
use rmdupes::actions::{ActionExecutor, FirstMember};
use rmdupes::cli::Cli;
use rmdupes::config::{Action, ActionConfiguration, ScanConfiguration};
use rmdupes::duplicates::DuplicateFinder;
use rmdupes::error::ExitCode;
use rmdupes::progress::QuietSink;
use rmdupes::run_with;
use rmdupes::signal::ShutdownHandler;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_auto_link_replaces_non_keeper() {
    let dir = tempdir().unwrap();
    let keeper = dir.path().join("a.txt");
    let other = dir.path().join("b.txt");
    fs::write(&keeper, b"linked content").unwrap();
    fs::write(&other, b"linked content").unwrap();

    let (registry, _) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&[dir.path().to_path_buf()], &QuietSink)
        .unwrap();
    let report = ActionExecutor::new(ActionConfiguration::new(Action::Link, true))
        .execute(&registry, &mut FirstMember);

    assert!(report.all_succeeded());
    assert_eq!(report.files_linked, 1);

    let keeper_meta = fs::symlink_metadata(&keeper).unwrap();
    assert!(keeper_meta.file_type().is_file());
    assert_eq!(fs::read(&keeper).unwrap(), b"linked content");

    let other_meta = fs::symlink_metadata(&other).unwrap();
    assert!(other_meta.file_type().is_symlink());
    let target = fs::read_link(&other).unwrap();
    assert!(target.is_absolute());
    assert_eq!(
        fs::canonicalize(&other).unwrap(),
        fs::canonicalize(&keeper).unwrap()
    );
}

#[test]
fn test_link_via_cli_then_rescan_finds_nothing() {
    let dir = tempdir().unwrap();
    for name in ["one", "two", "three"] {
        fs::write(dir.path().join(name), b"triplicate").unwrap();
    }
    let root = dir.path().to_str().unwrap();

    let cli = Cli::try_parse_from(["rm-dupes", "-q", "-l", "-N", root]).unwrap();
    let mut out = Vec::new();
    let code = run_with(&cli, &ShutdownHandler::new(), &mut out).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(String::from_utf8(out).unwrap().contains("Linked 2 files in 1 sets"));

    // "one" sorts first and is the keeper.
    assert!(fs::symlink_metadata(dir.path().join("one")).unwrap().is_file());
    assert!(fs::symlink_metadata(dir.path().join("two")).unwrap().is_symlink());
    assert!(fs::symlink_metadata(dir.path().join("three")).unwrap().is_symlink());

    let cli = Cli::try_parse_from(["rm-dupes", "-q", "-m", root]).unwrap();
    let code = run_with(&cli, &ShutdownHandler::new(), &mut Vec::new()).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}
