//! Read-only listings: projects, teams, policies
//!
//! Each listing is a single GET. Results are sorted by display name; a non-200
//! reply is reported and yields an empty list.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::services::report_failure;
use crate::application::{ApiResultExt, ApplicationResult};
use crate::domain::{Policy, Project, Team};
use crate::infrastructure::{ApiClient, InfraError};

#[derive(Debug, Clone)]
pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub fn list_projects(&self) -> ApplicationResult<Vec<Project>> {
        self.list("projects", "list projects", |p: &Project| p.title.as_str())
    }

    #[instrument(skip(self))]
    pub fn list_teams(&self) -> ApplicationResult<Vec<Team>> {
        self.list("teams", "list teams", |t: &Team| t.name.as_str())
    }

    #[instrument(skip(self))]
    pub fn list_policies(&self) -> ApplicationResult<Vec<Policy>> {
        self.list("policies", "list policies", |p: &Policy| p.title.as_str())
    }

    /// First project whose title equals `title`.
    pub fn find_project(&self, title: &str) -> ApplicationResult<Option<Project>> {
        Ok(self
            .list_projects()?
            .into_iter()
            .find(|p| p.title == title))
    }

    fn list<T, F>(&self, path: &str, action: &str, key: F) -> ApplicationResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> &str,
    {
        match self.api.get::<Vec<T>>(path) {
            Ok(items) => {
                debug!("{action}: {} items", items.len());
                Ok(sorted_by_name(items, key))
            }
            Err(InfraError::Http { body, .. }) => {
                report_failure(action, &body);
                Ok(Vec::new())
            }
            Err(e) => Err(e).with_action(action),
        }
    }
}

/// Stable ascending sort by the key `key` extracts.
pub fn sorted_by_name<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| key(a).cmp(key(b)));
    items
}
