//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{AddOutcome, PlaceholderService};
use crate::cli::args::{AddArgs, Cli, Commands, ConfigCommands, ResourceType};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{ReleaseGroup, ReleaseGroupRequest};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Entry point from `main`: builds the container from settings and runs the command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => execute_config(command, cli),
        command => {
            let settings = resolve_settings(cli)?;
            let container = ServiceContainer::new(settings)?;
            run_command(command, &container)
        }
    }
}

/// Load settings and apply the `--fossa-api-key` override.
pub fn effective_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(key) = &cli.fossa_api_key {
        settings.api_key = Some(key.clone());
    }
    Ok(settings)
}

/// Effective settings for commands that talk to FOSSA; an API key is required.
pub fn resolve_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = effective_settings(cli)?;
    if settings.api_key.as_deref().map_or(true, str::is_empty) {
        return Err(CliError::Usage(
            "missing API key: pass --fossa-api-key or set FOSSA_API_KEY".into(),
        ));
    }
    Ok(settings)
}

/// Run an API-backed command against an already wired container.
pub fn run_command(command: &Commands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        Commands::List {
            resource,
            release_projects,
        } => list(container, *resource, *release_projects),
        Commands::Add(args) => add(container, args),
        Commands::Copy {
            release_group_name_src,
            release_group_name_dest,
            release_group_version,
        } => copy(
            container,
            release_group_name_src,
            release_group_name_dest,
            release_group_version,
        ),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::InvalidArgs(
            "command does not use the FOSSA API".into(),
        )),
    }
}

#[instrument(skip(container))]
fn list(container: &ServiceContainer, resource: ResourceType, release_projects: bool) -> CliResult<()> {
    match resource {
        ResourceType::Projects => {
            let rows = container
                .catalog()
                .list_projects()?
                .into_iter()
                .map(|p| [p.title, p.locator])
                .collect();
            output::table("List of projects:", ["Project Name", "Project Locator"], rows);
        }
        ResourceType::Teams => {
            let rows = container
                .catalog()
                .list_teams()?
                .into_iter()
                .map(|t| [t.name, t.id.to_string()])
                .collect();
            output::table("List of teams:", ["Team Name", "Team ID"], rows);
        }
        ResourceType::Policies => {
            let rows = container
                .catalog()
                .list_policies()?
                .into_iter()
                .map(|p| [p.title, p.id.to_string()])
                .collect();
            output::table("List of policies:", ["Policy Name", "Policy ID"], rows);
        }
        ResourceType::ReleaseGroups => {
            let groups = container.release_groups().list(release_projects)?;
            if release_projects {
                print_release_projects(&groups);
            } else {
                print_release_groups(&groups);
            }
        }
    }
    Ok(())
}

fn print_release_groups(groups: &[ReleaseGroup]) {
    let rows = groups
        .iter()
        .map(|g| {
            let releases = g
                .releases
                .iter()
                .map(|r| r.title.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            [g.title.clone(), g.id.to_string(), releases]
        })
        .collect();
    output::table(
        "List of release groups:",
        ["Release group name", "Release group ID", "Releases"],
        rows,
    );
}

fn print_release_projects(groups: &[ReleaseGroup]) {
    let mut rows = Vec::new();
    for group in groups {
        for release in &group.releases {
            if release.projects.is_empty() {
                rows.push([
                    group.title.clone(),
                    release.title.clone(),
                    String::new(),
                    String::new(),
                    String::new(),
                ]);
            }
            for project in &release.projects {
                rows.push([
                    group.title.clone(),
                    release.title.clone(),
                    project.project_id.clone(),
                    project.branch.clone().unwrap_or_default(),
                    project.revision_id.clone(),
                ]);
            }
        }
    }
    output::table(
        "List of release groups:",
        ["Release group", "Release", "Project", "Branch", "Revision"],
        rows,
    );
}

#[instrument(skip(container))]
fn add(container: &ServiceContainer, args: &AddArgs) -> CliResult<()> {
    let placeholder = container.placeholder();
    ensure_tool(&placeholder, &container.settings.cli.binary)?;

    let request = ReleaseGroupRequest::from(args);
    let outcome = container.release_groups().add(&request, &placeholder)?;
    debug!("add: {:?}", outcome);

    match outcome {
        AddOutcome::AlreadyExists { group_id } => output::info(&format!(
            "Release group '{}' already has version '{}' (ID: {}). Nothing to do.",
            request.name, request.version, group_id
        )),
        AddOutcome::VersionAdded { group_id } => output::success(&format!(
            "Version '{}' added to release group '{}' (ID: {}).",
            request.version, request.name, group_id
        )),
        AddOutcome::Created => output::success("Release group created successfully."),
    }
    Ok(())
}

#[instrument(skip(container))]
fn copy(container: &ServiceContainer, source: &str, destination: &str, version: &str) -> CliResult<()> {
    ensure_tool(&container.placeholder(), &container.settings.cli.binary)?;

    let plan = container.release_groups().copy(source, destination, version)?;
    output::success(&format!(
        "Copied {} projects from '{}' to '{}' release '{}' (ID: {}).",
        plan.payload.projects.len(),
        source,
        destination,
        version,
        plan.release_id
    ));
    Ok(())
}

/// Abort unless the analysis binary answers `--version`.
fn ensure_tool(placeholder: &PlaceholderService, tool: &str) -> CliResult<()> {
    let version = placeholder.check_tool()?;
    output::success(&format!("{tool} exists: {version}"));
    Ok(())
}

fn execute_config(command: &ConfigCommands, cli: &Cli) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&effective_settings(cli)?.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no config directory on this platform)"),
            }
            if let Some(path) = &cli.config {
                output::info(&format!("explicit: {}", path.display()));
            }
        }
        ConfigCommands::Init { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => global_config_path().ok_or_else(|| {
                    CliError::Usage("no config directory on this platform; pass --config".into())
                })?,
            };
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}
