//! CLI tests: argument parsing and command dispatch against test doubles

use std::fs;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;

use fossa_release_groups::cli::args::ResourceType;
use fossa_release_groups::cli::commands::{
    effective_settings, execute_command, resolve_settings, run_command,
};
use fossa_release_groups::cli::{Cli, CliError, Commands};
use fossa_release_groups::config::Settings;
use fossa_release_groups::domain::{EntityId, ReleaseGroupRequest};
use fossa_release_groups::exitcode;
use fossa_release_groups::infrastructure::di::ServiceContainer;
use fossa_release_groups::infrastructure::traits::{HttpMethod, RealFileSystem};
use fossa_release_groups::util::testing::{
    init_test_setup, RecordingCommandRunner, ScriptedTransport,
};

const BASE: &str = "https://fossa.test/api";

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["fossa-release-groups"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

fn container(
    tmp: &TempDir,
    http: &Arc<ScriptedTransport>,
    cmd: &Arc<RecordingCommandRunner>,
) -> ServiceContainer {
    init_test_setup();
    let settings = Settings {
        api_url: BASE.into(),
        api_key: Some("key".into()),
        work_dir: tmp.path().to_path_buf(),
        ..Settings::default()
    };
    ServiceContainer::with_deps(
        settings,
        Arc::new(RealFileSystem),
        cmd.clone(),
        http.clone(),
    )
}

fn page_url(page: usize) -> String {
    format!("{BASE}/v2/release-groups?count=20&sort=latest-scan_desc&page={page}")
}

// ============================================================
// Parsing
// ============================================================

#[test]
fn given_add_with_all_options_when_parsed_then_request_carries_them() {
    // Act
    let cli = parse(&[
        "--fossa-api-key",
        "k",
        "add",
        "--release-group-name",
        "X",
        "--release-group-version",
        "1.0",
        "--security-policy-id",
        "sec1",
        "--quality-policy-id",
        "12",
        "--teams",
        "7",
        "9",
    ]);

    // Assert
    let Commands::Add(args) = &cli.command else {
        panic!("expected add, got {:?}", cli.command);
    };
    let request = ReleaseGroupRequest::from(args);
    assert_eq!(request.name, "X");
    assert_eq!(request.version, "1.0");
    assert_eq!(request.licensing_policy_id, None);
    assert_eq!(request.security_policy_id, Some(EntityId::Text("sec1".into())));
    assert_eq!(request.quality_policy_id, Some(EntityId::Number(12)));
    assert_eq!(request.teams, vec![EntityId::Number(7), EntityId::Number(9)]);
    assert_eq!(cli.fossa_api_key.as_deref(), Some("k"));
}

#[test]
fn given_list_release_groups_when_parsed_then_resource_and_flag_set() {
    let cli = parse(&["list", "--type", "release-groups", "--release-projects"]);

    match cli.command {
        Commands::List {
            resource,
            release_projects,
        } => {
            assert_eq!(resource, ResourceType::ReleaseGroups);
            assert!(release_projects);
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn given_unknown_resource_type_when_parsed_then_rejected() {
    let result = Cli::try_parse_from(["fossa-release-groups", "list", "--type", "widgets"]);
    assert!(result.is_err());
}

#[test]
fn given_add_without_version_when_parsed_then_rejected() {
    let result = Cli::try_parse_from([
        "fossa-release-groups",
        "add",
        "--release-group-name",
        "X",
    ]);
    assert!(result.is_err());
}

#[test]
fn given_verbosity_after_subcommand_when_parsed_then_counted() {
    let cli = parse(&["list", "--type", "teams", "-vv"]);
    assert_eq!(cli.verbose, 2);
}

// ============================================================
// Settings resolution
// ============================================================

#[test]
fn given_key_in_file_and_flag_when_resolve_then_flag_wins() {
    // Arrange
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "api_key = \"from-file\"\n").unwrap();
    let path_arg = path.to_string_lossy().to_string();
    let cli = parse(&[
        "--config",
        &path_arg,
        "--fossa-api-key",
        "from-flag",
        "list",
        "--type",
        "projects",
    ]);

    // Act
    let settings = resolve_settings(&cli).unwrap();

    // Assert
    assert_eq!(settings.api_key.as_deref(), Some("from-flag"));
}

#[test]
fn given_empty_api_key_when_resolve_then_usage_error() {
    let cli = parse(&["--fossa-api-key", "", "list", "--type", "projects"]);

    let err = resolve_settings(&cli).unwrap_err();

    assert!(matches!(err, CliError::Usage(_)));
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_key_flag_when_config_show_settings_then_key_applied_and_masked() {
    // Arrange
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "api_key = \"from-file-0000\"\n").unwrap();
    let path_arg = path.to_string_lossy().to_string();
    let cli = parse(&[
        "--config",
        &path_arg,
        "--fossa-api-key",
        "from-flag-9876",
        "config",
        "show",
    ]);

    // Act
    let settings = effective_settings(&cli).unwrap();
    let shown = settings.to_toml().unwrap();

    // Assert
    assert_eq!(settings.api_key.as_deref(), Some("from-flag-9876"));
    assert!(shown.contains("****9876"));
    assert!(!shown.contains("0000"));
    assert!(execute_command(&cli).is_ok());
}

#[test]
fn given_empty_key_when_config_show_then_no_key_required() {
    let cli = parse(&["--fossa-api-key", "", "config", "show"]);

    assert!(effective_settings(&cli).is_ok());
    assert!(execute_command(&cli).is_ok());
}

#[test]
fn given_default_settings_when_building_real_container_then_ok() {
    let container = ServiceContainer::new(Settings::default());
    assert!(container.is_ok());
}

// ============================================================
// Dispatch
// ============================================================

#[test]
fn given_list_teams_when_run_then_single_get() {
    let tmp = TempDir::new().unwrap();
    let http = Arc::new(ScriptedTransport::new());
    let cmd = Arc::new(RecordingCommandRunner::new());
    http.respond(
        HttpMethod::Get,
        format!("{BASE}/teams"),
        200,
        json!([{"id": 1, "name": "dev"}]).to_string(),
    );
    let cli = parse(&["list", "--type", "teams"]);

    run_command(&cli.command, &container(&tmp, &http, &cmd)).unwrap();

    assert_eq!(http.requests().len(), 1);
    assert!(cmd.calls().is_empty());
}

#[test]
fn given_missing_tool_when_add_then_unavailable_before_any_request() {
    // Arrange
    let tmp = TempDir::new().unwrap();
    let http = Arc::new(ScriptedTransport::new());
    let cmd = Arc::new(RecordingCommandRunner::missing_binary());
    let cli = parse(&[
        "add",
        "--release-group-name",
        "X",
        "--release-group-version",
        "1.0",
    ]);

    // Act
    let err = run_command(&cli.command, &container(&tmp, &http, &cmd)).unwrap_err();

    // Assert
    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    assert!(http.requests().is_empty());
}

#[test]
fn given_existing_version_when_add_then_ok_without_mutation() {
    // Arrange
    let tmp = TempDir::new().unwrap();
    let http = Arc::new(ScriptedTransport::new());
    let cmd = Arc::new(RecordingCommandRunner::new().with_output("--version", 0, "fossa 3.9.0", ""));
    http.respond(
        HttpMethod::Get,
        page_url(1),
        200,
        json!({"releaseGroups": [{"id": 5, "title": "X"}], "total": 1}).to_string(),
    );
    http.respond(
        HttpMethod::Get,
        format!("{BASE}/project_group/5"),
        200,
        json!({"releases": [{"id": 50, "title": "1.0"}]}).to_string(),
    );
    let cli = parse(&[
        "add",
        "--release-group-name",
        "X",
        "--release-group-version",
        "1.0",
    ]);

    // Act
    run_command(&cli.command, &container(&tmp, &http, &cmd)).unwrap();

    // Assert
    assert!(http.mutations().is_empty());
    assert_eq!(cmd.calls().len(), 1, "only the --version probe runs");
}

#[test]
fn given_missing_source_when_copy_then_data_error_exit_code() {
    let tmp = TempDir::new().unwrap();
    let http = Arc::new(ScriptedTransport::new());
    let cmd = Arc::new(RecordingCommandRunner::new());
    http.respond(
        HttpMethod::Get,
        page_url(1),
        200,
        json!({"releaseGroups": [], "total": 0}).to_string(),
    );
    let cli = parse(&[
        "copy",
        "--release-group-name-src",
        "A",
        "--release-group-name-dest",
        "B",
        "--release-group-version",
        "1.0",
    ]);

    let err = run_command(&cli.command, &container(&tmp, &http, &cmd)).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(err.to_string().contains("A"));
    assert!(http.mutations().is_empty());
}

#[test]
fn given_config_command_when_run_command_then_invalid_args() {
    let tmp = TempDir::new().unwrap();
    let http = Arc::new(ScriptedTransport::new());
    let cmd = Arc::new(RecordingCommandRunner::new());
    let cli = parse(&["config", "show"]);

    let err = run_command(&cli.command, &container(&tmp, &http, &cmd)).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
}

// ============================================================
// config init
// ============================================================

#[test]
fn given_new_path_when_config_init_then_template_written_and_not_overwritten() {
    // Arrange
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("config.toml");
    let path_arg = path.to_string_lossy().to_string();
    let init = parse(&["--config", &path_arg, "config", "init"]);

    // Act
    execute_command(&init).unwrap();
    let second = execute_command(&init);
    let forced = execute_command(&parse(&["--config", &path_arg, "config", "init", "--force"]));

    // Assert
    assert_eq!(fs::read_to_string(&path).unwrap(), Settings::template());
    assert!(matches!(second, Err(CliError::Usage(_))));
    assert!(forced.is_ok());
}
