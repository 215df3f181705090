use filetime::{set_file_atime, set_file_mtime, FileTime};
use rmdupes::config::{ConfigError, ScanConfiguration};
use rmdupes::duplicates::{
    DuplicateFinder, DuplicateSetRegistry, FinderError, SetKey, SetOrder, SortOrder, SortStrategy,
};
use rmdupes::progress::QuietSink;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn scan_sorted(root: &Path, strategy: SortStrategy, descending: bool) -> DuplicateSetRegistry {
    let config = ScanConfiguration {
        sort: SortOrder::new(strategy, descending),
        ..Default::default()
    };
    DuplicateFinder::new(config)
        .scan(&[root.to_path_buf()], &QuietSink)
        .unwrap()
        .0
}

fn names(registry: &DuplicateSetRegistry, set: usize) -> Vec<String> {
    registry
        .get(set)
        .unwrap()
        .paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn make(root: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|n| {
            let p = root.join(n);
            fs::write(&p, b"same bytes").unwrap();
            p
        })
        .collect()
}

#[test]
fn test_name_ascending_and_descending() {
    let dir = tempdir().unwrap();
    make(dir.path(), &["beta", "alpha", "gamma"]);

    let up = scan_sorted(dir.path(), SortStrategy::Name, false);
    assert_eq!(names(&up, 0), ["alpha", "beta", "gamma"]);

    let down = scan_sorted(dir.path(), SortStrategy::Name, true);
    assert_eq!(names(&down, 0), ["gamma", "beta", "alpha"]);
}

#[test]
fn test_last_write_time_order() {
    let dir = tempdir().unwrap();
    let paths = make(dir.path(), &["a", "b", "c"]);
    set_file_mtime(&paths[0], FileTime::from_unix_time(3_000, 0)).unwrap();
    set_file_mtime(&paths[1], FileTime::from_unix_time(1_000, 0)).unwrap();
    set_file_mtime(&paths[2], FileTime::from_unix_time(2_000, 0)).unwrap();

    let oldest_first = scan_sorted(dir.path(), SortStrategy::LastWriteTime, false);
    assert_eq!(names(&oldest_first, 0), ["b", "c", "a"]);

    let newest_first = scan_sorted(dir.path(), SortStrategy::LastWriteTime, true);
    assert_eq!(names(&newest_first, 0), ["a", "c", "b"]);
}

#[test]
fn test_equal_times_break_ties_by_path() {
    let dir = tempdir().unwrap();
    let paths = make(dir.path(), &["z", "y", "x"]);
    for p in &paths {
        set_file_mtime(p, FileTime::from_unix_time(5_000, 0)).unwrap();
    }

    let registry = scan_sorted(dir.path(), SortStrategy::LastWriteTime, true);
    assert_eq!(names(&registry, 0), ["x", "y", "z"]);
}

#[test]
fn test_last_read_time_order() {
    let dir = tempdir().unwrap();
    let paths = make(dir.path(), &["a", "b"]);
    set_file_atime(&paths[0], FileTime::from_unix_time(2_000_000, 0)).unwrap();
    set_file_atime(&paths[1], FileTime::from_unix_time(1_000_000, 0)).unwrap();

    let registry = scan_sorted(dir.path(), SortStrategy::LastReadTime, false);
    assert_eq!(names(&registry, 0), ["b", "a"]);
}

#[test]
fn test_creation_time_supported_or_rejected_up_front() {
    let dir = tempdir().unwrap();
    make(dir.path(), &["a", "b"]);

    let config = ScanConfiguration {
        sort: SortOrder::new(SortStrategy::CreationTime, false),
        ..Default::default()
    };
    match DuplicateFinder::new(config).scan(&[dir.path().to_path_buf()], &QuietSink) {
        Ok((registry, _)) => assert_eq!(registry.file_count(), 2),
        Err(FinderError::Config(ConfigError::TimestampUnsupported { .. })) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_set_order_by_space() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s1"), b"ab").unwrap();
    fs::write(dir.path().join("s2"), b"ab").unwrap();
    for name in ["l1", "l2", "l3"] {
        fs::write(dir.path().join(name), b"abcdef").unwrap();
    }

    let mut registry = scan_sorted(dir.path(), SortStrategy::Name, false);
    registry.sort_sets(SetOrder::new(SetKey::SpaceOccupied, true));
    assert_eq!(registry.get(0).unwrap().space_occupied(), 12);
    assert_eq!(registry.get(1).unwrap().space_occupied(), 2);

    registry.sort_sets(SetOrder::new(SetKey::MemberSize, false));
    assert_eq!(registry.get(0).unwrap().size(), 2);
}
