//! Domain entities: records exchanged with the FOSSA API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Title given to the placeholder project on the platform.
pub const PLACEHOLDER_TITLE: &str = "test-project-for-release-group-creation";
/// Branch the placeholder project is analyzed on.
pub const PLACEHOLDER_BRANCH: &str = "test-branch";
/// Revision label the placeholder project is analyzed at.
pub const PLACEHOLDER_REVISION: &str = "test-revision";
/// Empty dependency manifest that makes the placeholder analyzable.
pub const PLACEHOLDER_MANIFEST: &str = "requirements.txt";

/// Platform-assigned identifier.
///
/// The API is not consistent about numeric vs. string ids, so both are
/// accepted and echoed back in the form they arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    /// Integers become `Number`, anything else stays `Text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(EntityId::Number)
            .unwrap_or_else(|_| EntityId::Text(s.to_string())))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

/// Scanned project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    /// Opaque `org/package$revision`-style identifier
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: EntityId,
    pub title: String,
}

/// Reference from a release to one analyzed project revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub project_id: String,
    /// Echoed back as sent, `null` included
    #[serde(default)]
    pub branch: Option<String>,
    pub revision_id: String,
}

impl ProjectRef {
    /// Build a reference to `locator` at `revision` on `branch`.
    ///
    /// The revision id is `locator$revision`.
    pub fn at_revision(locator: &str, branch: &str, revision: &str) -> Self {
        Self {
            project_id: locator.to_string(),
            branch: Some(branch.to_string()),
            revision_id: format!("{locator}${revision}"),
        }
    }

    /// Reference to the placeholder project with the given locator.
    pub fn placeholder(locator: &str) -> Self {
        Self::at_revision(locator, PLACEHOLDER_BRANCH, PLACEHOLDER_REVISION)
    }
}

/// Version-labelled snapshot within a release group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: EntityId,
    /// Version label
    pub title: String,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
}

/// Named collection of releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseGroup {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl ReleaseGroup {
    /// First release whose title equals `version`.
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.title == version)
    }
}

/// One page of `GET /v2/release-groups`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseGroupPage {
    #[serde(default)]
    pub release_groups: Vec<ReleaseGroup>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Body of `GET /project_group/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseGroupDetail {
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Release body used by `POST /project_group/{id}/release` and
/// `PUT /project_group/{id}/release/{releaseId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePayload {
    pub title: String,
    pub projects: Vec<ProjectRef>,
    pub projects_to_delete: Vec<ProjectRef>,
}

impl ReleasePayload {
    /// Payload that only adds `projects`; nothing is marked for deletion.
    pub fn additive(title: impl Into<String>, projects: Vec<ProjectRef>) -> Self {
        Self {
            title: title.into(),
            projects,
            projects_to_delete: Vec::new(),
        }
    }
}

/// Initial release embedded in a new release group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialRelease {
    pub title: String,
    pub projects: Vec<ProjectRef>,
}

/// Body of `POST /project_group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReleaseGroup {
    pub title: String,
    pub release: InitialRelease,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licensing_policy_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_policy_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<EntityId>,
}

/// User request for `add`: which group/version, and what to attach on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseGroupRequest {
    pub name: String,
    pub version: String,
    pub licensing_policy_id: Option<EntityId>,
    pub security_policy_id: Option<EntityId>,
    pub quality_policy_id: Option<EntityId>,
    pub teams: Vec<EntityId>,
}

impl ReleaseGroupRequest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Creation payload whose only release carries `project`.
    pub fn to_payload(&self, project: ProjectRef) -> NewReleaseGroup {
        NewReleaseGroup {
            title: self.name.clone(),
            release: InitialRelease {
                title: self.version.clone(),
                projects: vec![project],
            },
            licensing_policy_id: self.licensing_policy_id.clone(),
            security_policy_id: self.security_policy_id.clone(),
            quality_policy_id: self.quality_policy_id.clone(),
            teams: self.teams.clone(),
        }
    }
}

/// Expand `~` and environment variables in a path-like string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
