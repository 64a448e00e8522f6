//! Release-group reconciliation: lookup, pagination bounds, copy planning
//!
//! Lookups use the first group whose title matches. Titles are assumed unique
//! per organisation; the API does not enforce it, so duplicates resolve to
//! whichever group the listing returned first.

use crate::domain::entities::{EntityId, ReleaseGroup, ReleasePayload};
use crate::domain::DomainError;

/// Where a `(name, version)` pair stands among existing release groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseLookup {
    /// Group and version both exist.
    VersionExists { group_id: EntityId },
    /// Group exists, version does not.
    MissingVersion { group_id: EntityId },
    /// No group with that title.
    NotFound,
}

impl ReleaseLookup {
    pub fn find(groups: &[ReleaseGroup], name: &str, version: &str) -> Self {
        match groups.iter().find(|g| g.title == name) {
            Some(group) if group.release(version).is_some() => Self::VersionExists {
                group_id: group.id.clone(),
            },
            Some(group) => Self::MissingVersion {
                group_id: group.id.clone(),
            },
            None => Self::NotFound,
        }
    }
}

/// Decide whether another page of release groups should be requested.
///
/// Continue only while the page held exactly `page_size` items and
/// `accumulated` is still below the reported total. Without a total there is
/// no bound, so paging stops.
pub fn has_next_page(
    fetched: usize,
    page_size: usize,
    accumulated: usize,
    total: Option<usize>,
) -> bool {
    match total {
        Some(total) => fetched == page_size && accumulated < total,
        None => false,
    }
}

/// Resolved `copy` operation: which release to overwrite and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub group_id: EntityId,
    pub release_id: EntityId,
    pub payload: ReleasePayload,
}

impl CopyPlan {
    /// Endpoint path of the destination release.
    pub fn path(&self) -> String {
        format!("project_group/{}/release/{}", self.group_id, self.release_id)
    }
}

/// Plan copying the projects of release `version` from group `source` onto the
/// same-titled release of group `destination`.
///
/// The destination's project list is replaced by the source's; nothing is
/// marked for deletion. The source is checked first.
pub fn plan_copy(
    groups: &[ReleaseGroup],
    source: &str,
    destination: &str,
    version: &str,
) -> Result<CopyPlan, DomainError> {
    let source_release = groups
        .iter()
        .find(|g| g.title == source)
        .and_then(|g| g.release(version))
        .ok_or_else(|| DomainError::SourceReleaseNotFound {
            group: source.to_string(),
            version: version.to_string(),
        })?;

    let (dest_group, dest_release) = groups
        .iter()
        .find(|g| g.title == destination)
        .and_then(|g| g.release(version).map(|r| (g, r)))
        .ok_or_else(|| DomainError::DestinationReleaseNotFound {
            group: destination.to_string(),
            version: version.to_string(),
        })?;

    Ok(CopyPlan {
        group_id: dest_group.id.clone(),
        release_id: dest_release.id.clone(),
        payload: ReleasePayload::additive(version, source_release.projects.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ProjectRef, Release};

    fn group(id: i64, title: &str, releases: Vec<Release>) -> ReleaseGroup {
        ReleaseGroup {
            id: EntityId::Number(id),
            title: title.to_string(),
            releases,
        }
    }

    fn release(id: i64, title: &str, projects: Vec<ProjectRef>) -> Release {
        Release {
            id: EntityId::Number(id),
            title: title.to_string(),
            projects,
        }
    }

    fn project(id: &str) -> ProjectRef {
        ProjectRef {
            project_id: id.to_string(),
            branch: Some("main".to_string()),
            revision_id: format!("{id}$abc"),
        }
    }

    #[test]
    fn given_group_with_version_when_find_then_version_exists() {
        let groups = vec![group(1, "X", vec![release(10, "1.0", vec![])])];
        assert_eq!(
            ReleaseLookup::find(&groups, "X", "1.0"),
            ReleaseLookup::VersionExists {
                group_id: EntityId::Number(1)
            }
        );
    }

    #[test]
    fn given_group_without_version_when_find_then_missing_version_with_group_id() {
        let groups = vec![group(1, "X", vec![release(10, "1.0", vec![])])];
        assert_eq!(
            ReleaseLookup::find(&groups, "X", "2.0"),
            ReleaseLookup::MissingVersion {
                group_id: EntityId::Number(1)
            }
        );
    }

    #[test]
    fn given_unknown_title_when_find_then_not_found() {
        let groups = vec![group(1, "X", vec![release(10, "1.0", vec![])])];
        assert_eq!(ReleaseLookup::find(&groups, "Y", "1.0"), ReleaseLookup::NotFound);
    }

    #[test]
    fn given_duplicate_titles_when_find_then_first_match_wins() {
        let groups = vec![
            group(1, "X", vec![]),
            group(2, "X", vec![release(20, "1.0", vec![])]),
        ];
        assert_eq!(
            ReleaseLookup::find(&groups, "X", "1.0"),
            ReleaseLookup::MissingVersion {
                group_id: EntityId::Number(1)
            }
        );
    }

    #[test]
    fn test_has_next_page() {
        // full page, below total
        assert!(has_next_page(20, 20, 20, Some(45)));
        // full page, total reached
        assert!(!has_next_page(20, 20, 40, Some(40)));
        // short page
        assert!(!has_next_page(5, 20, 45, Some(45)));
        // empty page
        assert!(!has_next_page(0, 20, 0, None));
        // no total reported
        assert!(!has_next_page(20, 20, 20, None));
        // oversized page
        assert!(!has_next_page(25, 20, 25, Some(45)));
        // inconsistent total smaller than what we already have
        assert!(!has_next_page(20, 20, 20, Some(3)));
    }

    #[test]
    fn given_both_releases_when_plan_copy_then_targets_destination_release() {
        let groups = vec![
            group(1, "A", vec![release(10, "1.0", vec![project("p1")])]),
            group(2, "B", vec![release(20, "1.0", vec![project("old")])]),
        ];

        let plan = plan_copy(&groups, "A", "B", "1.0").unwrap();

        assert_eq!(plan.group_id, EntityId::Number(2));
        assert_eq!(plan.release_id, EntityId::Number(20));
        assert_eq!(plan.path(), "project_group/2/release/20");
        assert_eq!(plan.payload.title, "1.0");
        assert_eq!(plan.payload.projects, vec![project("p1")]);
        assert!(plan.payload.projects_to_delete.is_empty());
    }

    #[test]
    fn given_source_without_version_when_plan_copy_then_source_error() {
        let groups = vec![
            group(1, "A", vec![release(10, "2.0", vec![])]),
            group(2, "B", vec![release(20, "1.0", vec![])]),
        ];

        let err = plan_copy(&groups, "A", "B", "1.0").unwrap_err();

        assert_eq!(
            err,
            DomainError::SourceReleaseNotFound {
                group: "A".into(),
                version: "1.0".into()
            }
        );
    }

    #[test]
    fn given_missing_destination_group_when_plan_copy_then_destination_error() {
        let groups = vec![group(1, "A", vec![release(10, "1.0", vec![project("p1")])])];

        let err = plan_copy(&groups, "A", "B", "1.0").unwrap_err();

        assert!(matches!(err, DomainError::DestinationReleaseNotFound { .. }));
    }
}
