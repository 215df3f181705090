use rmdupes::config::{ConfigError, ScanConfiguration, Settings, DEFAULT_IO_THREADS};
use rmdupes::duplicates::{DuplicateFinder, FinderError, SortStrategy};
use rmdupes::progress::{EventCollector, QuietSink};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_settings_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "sort = \"last-write-time\"\ndescending = true\nio_threads = 2\ntrash = true\n",
    )
    .unwrap();

    let settings = Settings::load_from(Some(&path)).unwrap();
    assert_eq!(settings.sort, SortStrategy::LastWriteTime);
    assert!(settings.descending);
    assert_eq!(settings.io_threads, 2);
    assert!(settings.trash);
    assert!(!settings.skip_hidden);
}

#[test]
fn test_missing_settings_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let settings = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(settings.sort, SortStrategy::Name);
    assert_eq!(settings.io_threads, DEFAULT_IO_THREADS);
}

#[test]
fn test_malformed_settings_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "sort = \"sideways\"\n").unwrap();

    assert!(Settings::load_from(Some(&path)).is_err());
}

#[test]
fn test_saved_settings_are_loaded_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/config.toml");
    let settings = Settings {
        sort: SortStrategy::Size,
        follow_symlinks: true,
        ..Settings::default()
    };

    settings.save_to(&path).unwrap();
    assert_eq!(Settings::load_from(Some(&path)).unwrap(), settings);
}

#[test]
fn test_invalid_range_rejected_before_any_event() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();

    let sink = EventCollector::new();
    let config = ScanConfiguration {
        min_size: 100,
        max_size: 10,
        ..Default::default()
    };
    let err = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()], &sink)
        .unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::InvalidSizeRange { min: 100, max: 10 })
    ));
    assert!(sink.events().is_empty());
}

#[test]
fn test_zero_threads_rejected() {
    let dir = tempdir().unwrap();
    let config = ScanConfiguration {
        io_threads: 0,
        ..Default::default()
    };
    let err = DuplicateFinder::new(config)
        .scan(&[dir.path().to_path_buf()], &QuietSink)
        .unwrap_err();

    assert!(matches!(
        err,
        FinderError::Config(ConfigError::InvalidThreadCount)
    ));
}

#[test]
fn test_skip_hidden_setting() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("visible"), b"dup").unwrap();
    fs::write(dir.path().join(".hidden"), b"dup").unwrap();

    let roots = [dir.path().to_path_buf()];
    let (all, _) = DuplicateFinder::new(ScanConfiguration::default())
        .scan(&roots, &QuietSink)
        .unwrap();
    assert_eq!(all.set_count(), 1);

    let config = ScanConfiguration {
        skip_hidden: true,
        ..Default::default()
    };
    let (visible, summary) = DuplicateFinder::new(config).scan(&roots, &QuietSink).unwrap();
    assert!(visible.is_empty());
    assert_eq!(summary.files_examined, 1);
}
