//! Integration tests for Settings loading with layered precedence.
//!
//! Note: These tests assume no global config file is present, so the explicit
//! file is layered directly over the compiled defaults.

use std::fs;

use tempfile::TempDir;

use fossa_release_groups::application::ApplicationError;
use fossa_release_groups::config::Settings;

// ============================================================
// Settings::load() explicit file
// ============================================================

#[test]
fn given_explicit_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let content = r#"
api_url = "https://fossa.internal.example/api"
http_timeout_secs = 90

[cli]
binary = "/opt/fossa/bin/fossa"
"#;
    fs::write(&path, content).unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.api_url, "https://fossa.internal.example/api");
    assert_eq!(settings.http_timeout_secs, 90);
    assert_eq!(settings.cli.binary, "/opt/fossa/bin/fossa");
}

#[test]
fn given_work_dir_with_env_var_when_load_then_expanded() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "work_dir = \"$HOME/fossa-work\"\n").unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(
        settings.work_dir,
        std::path::PathBuf::from(format!("{home}/fossa-work"))
    );
    assert!(settings
        .placeholder_dir()
        .ends_with("fossa-work/test-project-for-release-group-creation"));
}

#[test]
fn given_missing_explicit_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_invalid_toml_when_load_then_config_error_names_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "api_url = [not toml").unwrap();

    // Act
    let err = Settings::load(Some(&path)).unwrap_err();

    // Assert
    match err {
        ApplicationError::Config { message } => {
            assert!(message.contains("broken.toml"), "message: {message}")
        }
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn given_wrong_type_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "http_timeout_secs = \"soon\"\n").unwrap();

    let result = Settings::load(Some(&path));

    assert!(result.is_err());
}

// ============================================================
// Environment overrides
// ============================================================

#[test]
fn given_env_override_when_load_then_env_wins_over_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[cli]\napi_key_flag = \"--from-file\"\n").unwrap();
    std::env::set_var("FOSSA_RG__CLI__API_KEY_FLAG", "--from-env");

    // Act
    let result = Settings::load(Some(&path));
    std::env::remove_var("FOSSA_RG__CLI__API_KEY_FLAG");

    // Assert
    let settings = result.expect("load settings");
    assert_eq!(settings.cli.api_key_flag, "--from-env");
}

// ============================================================
// Template
// ============================================================

#[test]
fn given_template_written_when_load_then_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert_eq!(settings.api_url, Settings::default().api_url);
    assert_eq!(settings.cli.binary, "fossa");
}
