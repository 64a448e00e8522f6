//! Release groups: paginated listing and reconciliation
//!
//! `add` creates a group or a version depending on what already exists;
//! `copy` overwrites one group's release project list with another's.

use tracing::{debug, info, instrument};

use crate::application::services::{report_failure, PlaceholderService};
use crate::application::{ApiResultExt, ApplicationResult};
use crate::domain::{
    has_next_page, plan_copy, CopyPlan, EntityId, ProjectRef, ReleaseGroup, ReleaseGroupDetail,
    ReleaseGroupPage, ReleaseGroupRequest, ReleaseLookup, ReleasePayload,
};
use crate::infrastructure::{ApiClient, InfraError};

/// Release groups requested per page.
pub const PAGE_SIZE: usize = 20;
/// Most recently scanned first.
pub const SORT_ORDER: &str = "latest-scan_desc";

/// Result of `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Group and version already existed; nothing was changed.
    AlreadyExists { group_id: EntityId },
    /// Version added to an existing group.
    VersionAdded { group_id: EntityId },
    /// New group created with the version as its first release.
    Created,
}

#[derive(Debug, Clone)]
pub struct ReleaseGroupService {
    api: ApiClient,
}

impl ReleaseGroupService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All release groups with their releases.
    ///
    /// Project references inside releases are kept only when
    /// `include_projects` is set. A non-200 page ends pagination early and
    /// the groups fetched so far are returned.
    #[instrument(skip(self))]
    pub fn list(&self, include_projects: bool) -> ApplicationResult<Vec<ReleaseGroup>> {
        let mut groups = self.fetch_pages()?;
        for group in &mut groups {
            self.load_releases(group, include_projects)?;
        }
        Ok(groups)
    }

    fn fetch_pages(&self) -> ApplicationResult<Vec<ReleaseGroup>> {
        let mut groups: Vec<ReleaseGroup> = Vec::new();
        let mut page = 1;

        loop {
            let path = format!(
                "v2/release-groups?count={PAGE_SIZE}&sort={SORT_ORDER}&page={page}"
            );
            let result: ReleaseGroupPage = match self.api.get(&path) {
                Ok(result) => result,
                Err(InfraError::Http { body, .. }) => {
                    report_failure("list release groups", &body);
                    break;
                }
                Err(e) => return Err(e).with_action("list release groups"),
            };

            let fetched = result.release_groups.len();
            debug!(
                "page {page}: {fetched} release groups, total {:?}",
                result.total
            );
            if fetched == 0 {
                if groups.is_empty() {
                    info!("No release groups found.");
                }
                break;
            }

            groups.extend(result.release_groups);
            if let Some(total) = result.total {
                groups.truncate(total);
            }

            if !has_next_page(fetched, PAGE_SIZE, groups.len(), result.total) {
                break;
            }
            page += 1;
        }

        Ok(groups)
    }

    fn load_releases(
        &self,
        group: &mut ReleaseGroup,
        include_projects: bool,
    ) -> ApplicationResult<()> {
        let path = format!("project_group/{}", group.id);
        let detail: ReleaseGroupDetail = match self.api.get(&path) {
            Ok(detail) => detail,
            Err(InfraError::Http { body, .. }) => {
                report_failure(&format!("load release group '{}'", group.title), &body);
                return Ok(());
            }
            Err(e) => return Err(e).with_action("load release group"),
        };

        group.releases = detail.releases;
        if !include_projects {
            for release in &mut group.releases {
                release.projects.clear();
            }
        }
        Ok(())
    }

    /// Where `(name, version)` stands among the existing groups.
    #[instrument(skip(self))]
    pub fn lookup(&self, name: &str, version: &str) -> ApplicationResult<ReleaseLookup> {
        let groups = self.list(false)?;
        Ok(ReleaseLookup::find(&groups, name, version))
    }

    /// `POST /project_group` with `project` as the only project of the first release.
    #[instrument(skip(self))]
    pub fn create(&self, request: &ReleaseGroupRequest, project: ProjectRef) -> ApplicationResult<()> {
        let payload = request.to_payload(project);
        self.api
            .post("project_group", &payload)
            .with_action("create release group")?;
        Ok(())
    }

    /// `POST /project_group/{id}/release` adding `version` with `project`.
    #[instrument(skip(self))]
    pub fn add_release(
        &self,
        group_id: &EntityId,
        version: &str,
        project: ProjectRef,
    ) -> ApplicationResult<()> {
        let payload = ReleasePayload::additive(version, vec![project]);
        self.api
            .post(&format!("project_group/{group_id}/release"), &payload)
            .with_action("add release")?;
        Ok(())
    }

    /// Create the group or the version, whichever is missing.
    ///
    /// The existence check runs before the placeholder is resolved, so an
    /// already existing version never triggers an analysis.
    #[instrument(skip(self, placeholder))]
    pub fn add(
        &self,
        request: &ReleaseGroupRequest,
        placeholder: &PlaceholderService,
    ) -> ApplicationResult<AddOutcome> {
        match self.lookup(&request.name, &request.version)? {
            ReleaseLookup::VersionExists { group_id } => Ok(AddOutcome::AlreadyExists { group_id }),
            ReleaseLookup::MissingVersion { group_id } => {
                let project = placeholder.resolve()?;
                self.add_release(&group_id, &request.version, project)?;
                Ok(AddOutcome::VersionAdded { group_id })
            }
            ReleaseLookup::NotFound => {
                let project = placeholder.resolve()?;
                self.create(request, project)?;
                Ok(AddOutcome::Created)
            }
        }
    }

    /// Replace the projects of `destination`'s release `version` with those of
    /// `source`'s release `version`.
    ///
    /// Nothing is sent when either release is missing.
    #[instrument(skip(self))]
    pub fn copy(&self, source: &str, destination: &str, version: &str) -> ApplicationResult<CopyPlan> {
        let groups = self.list(true)?;
        let plan = plan_copy(&groups, source, destination, version)?;
        debug!(
            "copy: {} projects onto {}",
            plan.payload.projects.len(),
            plan.path()
        );
        self.api
            .put(&plan.path(), &plan.payload)
            .with_action("copy release projects")?;
        Ok(plan)
    }
}
