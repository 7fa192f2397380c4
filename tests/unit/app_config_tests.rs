/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use transpage::app_config::{Config, LogLevel};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.database_path, None);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.max_entries, 256);
    assert!(config.marking.block_on_errors);
    assert!(config.validate().is_ok());
}

/// Test saving and loading a configuration file
#[test]
fn test_config_saveThenLoad_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.database_path = Some("pages.db".to_string());
    config.log_level = LogLevel::Debug;
    config.cache.max_entries = 8;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}

/// Test that missing sections fall back to their defaults
#[test]
fn test_config_fromPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "log_level": "trace", "cache": { "enabled": false } }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.log_level, LogLevel::Trace);
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.max_entries, 256);
    assert!(config.marking.block_on_errors);
    Ok(())
}

/// Test that malformed JSON is reported
#[test]
fn test_config_fromInvalidFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::from_file(&path).is_err());
    Ok(())
}

/// Test that an explicit database path wins over the default location
#[test]
fn test_resolvedDatabasePath_withExplicitPath_shouldUseIt() -> Result<()> {
    let config = Config {
        database_path: Some("/tmp/pages.db".to_string()),
        ..Config::default()
    };

    assert_eq!(config.resolved_database_path()?, std::path::PathBuf::from("/tmp/pages.db"));
    Ok(())
}
