//! Unit tests for configuration loading and precedence
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate GEMINI_API_KEY are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use voicedeck_common::config::{default_config_path, ConfigSource, TomlConfig, API_KEY_ENV};

#[test]
fn test_empty_toml_uses_defaults() {
    let config = TomlConfig::from_toml_str("").unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.port, 5760);
    assert_eq!(config.default_voice, "Kore");
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_partial_toml_overrides_only_given_keys() {
    let config = TomlConfig::from_toml_str(
        r#"
        port = 6001
        default_voice = "Zephyr"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.port, 6001);
    assert_eq!(config.default_voice, "Zephyr");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.model, TomlConfig::default().model);
}

#[test]
fn test_unknown_default_voice_is_rejected() {
    let err = TomlConfig::from_toml_str(r#"default_voice = "Nobody""#).unwrap_err();
    assert!(err.to_string().contains("Nobody"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    assert!(TomlConfig::from_toml_str("request_timeout_secs = 0").is_err());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = TomlConfig::from_toml_str("port = [").unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_load_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 7123").unwrap();

    let config = TomlConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.port, 7123);
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(TomlConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_locate_reports_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 7124").unwrap();

    let (config, source) = TomlConfig::locate(Some(file.path())).unwrap();
    assert_eq!(config.port, 7124);
    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_locate_reports_missing_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let expected = default_config_path().unwrap();
    let (config, source) = TomlConfig::locate(None).unwrap();

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(config, TomlConfig::default());
    assert_eq!(expected, dir.path().join("voicedeck").join("config.toml"));
    assert_eq!(source, ConfigSource::Defaults { missing: Some(expected) });
}

#[test]
#[serial]
fn test_api_key_cli_beats_env_and_toml() {
    env::set_var(API_KEY_ENV, "from-env");
    let config = TomlConfig {
        api_key: Some("from-toml".to_string()),
        ..TomlConfig::default()
    };

    assert_eq!(
        config.resolve_api_key(Some("from-cli")).as_deref(),
        Some("from-cli")
    );
    env::remove_var(API_KEY_ENV);
}

#[test]
#[serial]
fn test_api_key_env_beats_toml() {
    env::set_var(API_KEY_ENV, "from-env");
    let config = TomlConfig {
        api_key: Some("from-toml".to_string()),
        ..TomlConfig::default()
    };

    assert_eq!(config.resolve_api_key(None).as_deref(), Some("from-env"));
    env::remove_var(API_KEY_ENV);
}

#[test]
#[serial]
fn test_api_key_falls_back_to_toml_and_skips_blanks() {
    env::set_var(API_KEY_ENV, "   ");
    let config = TomlConfig {
        api_key: Some("from-toml".to_string()),
        ..TomlConfig::default()
    };
    assert_eq!(config.resolve_api_key(Some("")).as_deref(), Some("from-toml"));

    env::remove_var(API_KEY_ENV);
    let config = TomlConfig::default();
    assert_eq!(config.resolve_api_key(None), None);
}
