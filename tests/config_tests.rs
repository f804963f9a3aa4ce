//! Integration tests for layered configuration.

use filestate::config::{Config, ConfigError};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all FILESTATE_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("FILESTATE_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
backup_suffix = ".prev"
checkpoint_path = "/var/lib/agent/registry"
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.backup_suffix, ".prev");
    assert_eq!(config.temp_suffix, ".tmp");
    assert_eq!(
        config.checkpoint_path,
        Some(PathBuf::from("/var/lib/agent/registry"))
    );
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "backup_suffix = \".prev\"\ntemp_suffix = \".next\"\n").unwrap();

    std::env::set_var("FILESTATE_BACKUP_SUFFIX", ".bak");
    let config = Config::load(Some(path.as_path()));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.backup_suffix, ".bak");
    assert_eq!(config.temp_suffix, ".next");
}

#[test]
fn test_missing_explicit_file_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let err = Config::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_invalid_toml_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "backup_suffix = [1, 2").unwrap();

    assert!(matches!(
        Config::load(Some(path.as_path())),
        Err(ConfigError::Figment(_))
    ));
}

#[test]
fn test_invalid_suffix_from_env_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();

    std::env::set_var("FILESTATE_TEMP_SUFFIX", ".old");
    let result = Config::load(Some(path.as_path()));
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("temp_suffix"));
}
