use clap::Parser;
use rmdupes::actions::{ActionError, ActionExecutor, FirstMember, RemovalMode, StdinPrompt};
use rmdupes::cli::Cli;
use rmdupes::config::{Action, ActionConfiguration, ScanConfiguration};
use rmdupes::duplicates::{DuplicateFinder, DuplicateSetRegistry, FinderError};
use rmdupes::error::ExitCode;
use rmdupes::progress::QuietSink;
use rmdupes::run_with;
use rmdupes::signal::ShutdownHandler;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;

fn scan(root: &Path) -> DuplicateSetRegistry {
    DuplicateFinder::new(ScanConfiguration::default())
        .scan(&[root.to_path_buf()], &QuietSink)
        .unwrap()
        .0
}

fn three_copies(root: &Path) {
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(root.join(name), b"identical").unwrap();
    }
}

#[test]
fn test_auto_delete_keeps_first_in_sort_order() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, true))
        .execute(&registry, &mut FirstMember);

    assert!(report.all_succeeded());
    assert_eq!(report.files_removed, 2);
    assert_eq!(report.bytes_reclaimed, 18);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("c.txt").exists());
}

#[test]
fn test_auto_delete_via_cli() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let cli = Cli::try_parse_from([
        "rm-dupes",
        "-q",
        "-d",
        "-N",
        "--descending",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();
    let mut out = Vec::new();
    let code = run_with(&cli, &ShutdownHandler::new(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(text.contains("Removed 2 files in 1 sets"));
    assert!(dir.path().join("c.txt").exists());
    assert!(!dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
}

#[test]
fn test_interactive_choice_is_kept() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    let mut prompt = StdinPrompt::new(Cursor::new(b"2\n".to_vec()), Vec::new());
    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, false))
        .execute(&registry, &mut prompt);

    assert_eq!(report.files_removed, 2);
    assert!(dir.path().join("b.txt").exists());
    assert!(!dir.path().join("a.txt").exists());
    assert!(!dir.path().join("c.txt").exists());

    let transcript = String::from_utf8(prompt.into_writer()).unwrap();
    assert!(transcript.contains("Set 1"));
    assert!(transcript.contains("[2]"));
}

#[test]
fn test_unanswered_prompt_leaves_set_untouched() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    let mut prompt = StdinPrompt::new(Cursor::new(Vec::new()), Vec::new());
    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, false))
        .execute(&registry, &mut prompt);

    assert_eq!(report.files_removed, 0);
    assert_eq!(report.failure_count(), 1);
    assert!(matches!(report.failures[0], ActionError::KeeperSelection { .. }));
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(dir.path().join(name).exists());
    }
}

#[test]
fn test_vanished_member_does_not_stop_siblings() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    fs::write(dir.path().join("x1"), b"other set").unwrap();
    fs::write(dir.path().join("x2"), b"other set").unwrap();

    let registry = scan(dir.path());
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, true))
        .execute(&registry, &mut FirstMember);

    assert_eq!(report.sets_processed, 2);
    assert_eq!(report.files_removed, 2);
    assert_eq!(report.failure_count(), 1);
    assert!(matches!(report.failures[0], ActionError::NotFound(_)));
    assert!(!dir.path().join("c.txt").exists());
    assert!(!dir.path().join("x2").exists());
}

#[test]
fn test_modified_member_is_skipped() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    fs::write(dir.path().join("c.txt"), b"grown since the scan").unwrap();

    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, true))
        .execute(&registry, &mut FirstMember);

    assert_eq!(report.files_removed, 1);
    assert!(matches!(report.failures[0], ActionError::Modified(_)));
    assert!(dir.path().join("c.txt").exists());
}

#[test]
fn test_missing_keeper_skips_set() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    fs::remove_file(dir.path().join("a.txt")).unwrap();

    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, true))
        .execute(&registry, &mut FirstMember);

    assert_eq!(report.files_removed, 0);
    assert!(matches!(report.failures[0], ActionError::KeeperMissing(_)));
    assert!(dir.path().join("b.txt").exists());
    assert!(dir.path().join("c.txt").exists());
}

#[test]
fn test_interrupted_scan_changes_nothing() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let handler = ShutdownHandler::new();
    handler.request_shutdown();
    let cli = Cli::try_parse_from(["rm-dupes", "-q", "-d", "-N", dir.path().to_str().unwrap()])
        .unwrap();

    let err = run_with(&cli, &handler, &mut Vec::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::Interrupted)
    ));
    assert_eq!(ExitCode::from_error(&err), ExitCode::Interrupted);
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(dir.path().join(name).exists());
    }
}

#[test]
fn test_interrupted_executor_changes_nothing() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    let handler = ShutdownHandler::new();
    handler.request_shutdown();
    let report = ActionExecutor::new(ActionConfiguration::new(Action::Delete, true))
        .with_shutdown_flag(handler.get_flag())
        .execute(&registry, &mut FirstMember);

    assert!(report.interrupted);
    assert_eq!(report.files_removed, 0);
    assert_eq!(report.sets_processed, 0);
}

#[test]
fn test_summary_action_changes_nothing() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let registry = scan(dir.path());
    let report = ActionExecutor::new(
        ActionConfiguration::new(Action::Summary, true).with_removal(RemovalMode::Permanent),
    )
    .execute(&registry, &mut FirstMember);

    assert_eq!(report.sets_processed, 0);
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(dir.path().join(name).exists());
    }
}
