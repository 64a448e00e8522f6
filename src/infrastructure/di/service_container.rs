//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CatalogService, PlaceholderService, ReleaseGroupService};
use crate::config::Settings;
use crate::infrastructure::traits::{
    CommandRunner, FileSystem, HttpTransport, RealCommandRunner, RealFileSystem, ReqwestTransport,
};
use crate::infrastructure::{ApiClient, InfraResult};

/// Container holding the I/O boundaries and building services on demand.
pub struct ServiceContainer {
    /// Application settings (API key already resolved)
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// HTTP transport abstraction
    pub http: Arc<dyn HttpTransport>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let http = Arc::new(ReqwestTransport::new(settings.http_timeout())?);
        Ok(Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
            http,
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            http,
        }
    }

    /// API client authenticated with the configured key (empty if unset).
    pub fn api(&self) -> ApiClient {
        ApiClient::new(
            self.http.clone(),
            self.settings.api_url.clone(),
            self.settings.api_key.clone().unwrap_or_default(),
        )
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.api())
    }

    pub fn release_groups(&self) -> ReleaseGroupService {
        ReleaseGroupService::new(self.api())
    }

    pub fn placeholder(&self) -> PlaceholderService {
        PlaceholderService::new(
            self.fs.clone(),
            self.cmd.clone(),
            self.settings.clone(),
            self.catalog(),
        )
    }
}
