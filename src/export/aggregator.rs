//! Per-user record aggregation

use chrono::Utc;
use tracing::debug;

use super::directory::Directory;
use crate::metrics::record_principal_exported;
use crate::{CompositeRecord, OrganizationMembership, User};

/// Builds one [`CompositeRecord`] per user.
///
/// Calls, in order: the user's organizations, their global roles, then the
/// roles held in each organization. A failing lookup contributes an empty
/// list; aggregation itself never fails.
pub struct RecordAggregator<'a> {
    directory: &'a Directory,
}

impl<'a> RecordAggregator<'a> {
    /// Aggregator over `directory`.
    pub fn new(directory: &'a Directory) -> Self {
        Self { directory }
    }

    /// Gather organizations and roles for `user`.
    pub async fn aggregate(&self, user: User) -> CompositeRecord {
        let organizations = self.directory.user_organizations(&user.user_id).await;
        let global_roles = self.directory.user_roles(&user.user_id).await;

        let mut memberships = Vec::with_capacity(organizations.len());
        for organization in organizations {
            let roles = self
                .directory
                .user_organization_roles(&user.user_id, &organization.id)
                .await;
            memberships.push(OrganizationMembership {
                organization,
                roles,
            });
        }

        let record = CompositeRecord::new(user, global_roles, memberships, Utc::now());
        debug!(
            user_id = %record.user.user_id,
            organizations = record.metadata.total_organizations,
            global_roles = record.metadata.total_global_roles,
            org_roles = record.metadata.total_org_roles,
            "Aggregated user record"
        );
        record_principal_exported();
        record
    }
}
