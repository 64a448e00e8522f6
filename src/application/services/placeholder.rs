//! Placeholder project provisioning
//!
//! A release needs at least one analyzed project. The placeholder is an empty
//! local project (one empty `requirements.txt`) analyzed by the FOSSA CLI so
//! that the platform assigns it a locator.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::services::CatalogService;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    DomainError, ProjectRef, PLACEHOLDER_BRANCH, PLACEHOLDER_REVISION, PLACEHOLDER_TITLE,
};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

pub struct PlaceholderService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    catalog: CatalogService,
}

impl PlaceholderService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        catalog: CatalogService,
    ) -> Self {
        Self {
            fs,
            cmd,
            settings,
            catalog,
        }
    }

    /// Probe the analysis binary with `--version`.
    ///
    /// # Returns
    /// The version line the binary reported.
    #[instrument(skip(self))]
    pub fn check_tool(&self) -> ApplicationResult<String> {
        let tool = &self.settings.cli.binary;
        let output =
            self.cmd
                .run(tool, &["--version"])
                .map_err(|e| ApplicationError::ToolUnavailable {
                    tool: tool.clone(),
                    message: e.to_string(),
                })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApplicationError::ToolUnavailable {
                tool: tool.clone(),
                message: stderr.trim().to_string(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("check_tool: {tool} {version}");
        Ok(version)
    }

    /// Create the placeholder directory and run `analyze` then `test` in it.
    ///
    /// Exit codes of the two runs are logged, not checked: a failed analysis
    /// surfaces later when the project cannot be found.
    ///
    /// # Returns
    /// The placeholder directory.
    #[instrument(skip(self))]
    pub fn provision(&self) -> ApplicationResult<PathBuf> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| ApplicationError::Config {
                message: "no API key configured".into(),
            })?;
        let dir = self.settings.placeholder_dir();
        let manifest = self.settings.placeholder_manifest();

        self.fs
            .create_dir_all(&dir)
            .with_path_context("create placeholder directory", &dir)?;
        self.fs
            .write(&manifest, "")
            .with_path_context("write placeholder manifest", &manifest)?;

        let tool = self.settings.cli.binary.as_str();
        let key_flag = self.settings.cli.api_key_flag.as_str();
        let analyze = [
            "analyze",
            "--title",
            PLACEHOLDER_TITLE,
            "--revision",
            PLACEHOLDER_REVISION,
            "--branch",
            PLACEHOLDER_BRANCH,
            key_flag,
            api_key,
        ];
        let test = ["test", key_flag, api_key];

        for args in [&analyze[..], &test[..]] {
            info!("running {tool} {} in {}", args[0], dir.display());
            let output = self
                .cmd
                .run_in(tool, args, &dir)
                .with_path_context(&format!("run {tool} {}", args[0]), &dir)?;
            if !output.status.success() {
                warn!(
                    "{tool} {} exited with {:?}: {}",
                    args[0],
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
        }

        Ok(dir)
    }

    /// Reference to the placeholder project, provisioning it if the platform
    /// does not know it yet.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> ApplicationResult<ProjectRef> {
        if let Some(project) = self.catalog.find_project(PLACEHOLDER_TITLE)? {
            debug!("resolve: existing placeholder {}", project.locator);
            return Ok(ProjectRef::placeholder(&project.locator));
        }

        self.provision()?;

        let project = self
            .catalog
            .find_project(PLACEHOLDER_TITLE)?
            .ok_or_else(|| DomainError::PlaceholderNotFound {
                title: PLACEHOLDER_TITLE.to_string(),
            })?;
        debug!("resolve: provisioned placeholder {}", project.locator);
        Ok(ProjectRef::placeholder(&project.locator))
    }
}
