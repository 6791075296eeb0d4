//! Integration tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate TAPP_CONFIG are marked with #[serial]
//! so they run sequentially, not in parallel.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tapp_common::config::{
    load_config, load_toml_config, resolve_config_path, write_toml_config, ImportSettings,
    LoggingConfig, TomlConfig, CONFIG_ENV_VAR,
};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/tapp-from-env.toml");

    let cli = PathBuf::from("/tmp/tapp-from-cli.toml");
    let resolved = resolve_config_path(Some(&cli));
    assert_eq!(resolved, Some(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/tapp-from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/tapp-from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let config = load_config(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_load_from_env_var_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("import.toml");
    std::fs::write(
        &path,
        r#"
[logging]
level = "debug"

[import]
similarity_threshold = 0.75
wage_chunk_boundary = "05-01"

[import.key_aliases.applicants]
"Student Name (Last)" = "last_name"
"#,
    )
    .unwrap();

    env::set_var(CONFIG_ENV_VAR, &path);
    let config = load_config(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.import.similarity_threshold, 0.75);
    assert_eq!(config.import.boundary_month_day().unwrap(), (5, 1));
    assert_eq!(
        config.import.key_aliases["applicants"]["Student Name (Last)"],
        "last_name"
    );
}

#[test]
fn test_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "[import]\nwage_chunk_boundary = \"02-30\"\n").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("02-30"));
}

#[test]
fn test_unparsable_toml_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("garbage.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_atomic_write_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("nested").join("import.toml");

    let config = TomlConfig {
        logging: LoggingConfig {
            level: "warn".to_string(),
            file: Some(PathBuf::from("/var/log/tapp.log")),
        },
        import: ImportSettings {
            similarity_threshold: 0.9,
            ..Default::default()
        },
    };

    write_toml_config(&config, &target).unwrap();

    assert!(target.exists());
    assert!(!temp_dir.path().join("nested").join("import.toml.tmp").exists());

    let loaded = load_toml_config(&target).unwrap();
    assert_eq!(loaded, config);
}
