//! Role and membership mutations
//!
//! Each mutation is one executor call returning `true` on success. Failures
//! are logged and reported as `false`; nothing is rolled back.

use std::path::Path;
use tracing::{error, info, warn};

use super::directory::{Directory, UserLookup};
use crate::api::ApiOperation;
use crate::metrics::record_mutation;
use crate::output::OutputError;

/// One mutation to apply to each target user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAction {
    /// Assign a tenant-wide role
    AssignGlobalRole {
        /// Role id
        role_id: String,
    },
    /// Remove a tenant-wide role
    RemoveGlobalRole {
        /// Role id
        role_id: String,
    },
    /// Assign a role inside an organization
    AssignOrgRole {
        /// Organization id
        org_id: String,
        /// Role id
        role_id: String,
    },
    /// Remove a role inside an organization
    RemoveOrgRole {
        /// Organization id
        org_id: String,
        /// Role id
        role_id: String,
    },
    /// Add the user to an organization
    AddMember {
        /// Organization id
        org_id: String,
    },
    /// Remove the user from an organization
    RemoveMember {
        /// Organization id
        org_id: String,
    },
}

impl MutationAction {
    /// Stable action name for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssignGlobalRole { .. } => "assign_global_role",
            Self::RemoveGlobalRole { .. } => "remove_global_role",
            Self::AssignOrgRole { .. } => "assign_org_role",
            Self::RemoveOrgRole { .. } => "remove_org_role",
            Self::AddMember { .. } => "add_member",
            Self::RemoveMember { .. } => "remove_member",
        }
    }

    /// Human description for `user_id`.
    pub fn describe(&self, user_id: &str) -> String {
        match self {
            Self::AssignGlobalRole { role_id } => {
                format!("assign global role {role_id} to user {user_id}")
            }
            Self::RemoveGlobalRole { role_id } => {
                format!("remove global role {role_id} from user {user_id}")
            }
            Self::AssignOrgRole { org_id, role_id } => {
                format!("assign role {role_id} to user {user_id} in organization {org_id}")
            }
            Self::RemoveOrgRole { org_id, role_id } => {
                format!("remove role {role_id} from user {user_id} in organization {org_id}")
            }
            Self::AddMember { org_id } => {
                format!("add user {user_id} to organization {org_id}")
            }
            Self::RemoveMember { org_id } => {
                format!("remove user {user_id} from organization {org_id}")
            }
        }
    }

    /// The API operation performing this action for `user_id`.
    pub fn operation(&self, user_id: &str) -> ApiOperation {
        let user_id = user_id.to_string();
        match self {
            Self::AssignGlobalRole { role_id } => ApiOperation::AddUserRoles {
                user_id,
                role_ids: vec![role_id.clone()],
            },
            Self::RemoveGlobalRole { role_id } => ApiOperation::RemoveUserRoles {
                user_id,
                role_ids: vec![role_id.clone()],
            },
            Self::AssignOrgRole { org_id, role_id } => ApiOperation::AddOrganizationMemberRoles {
                org_id: org_id.clone(),
                user_id,
                role_ids: vec![role_id.clone()],
            },
            Self::RemoveOrgRole { org_id, role_id } => {
                ApiOperation::RemoveOrganizationMemberRoles {
                    org_id: org_id.clone(),
                    user_id,
                    role_ids: vec![role_id.clone()],
                }
            }
            Self::AddMember { org_id } => ApiOperation::AddOrganizationMembers {
                org_id: org_id.clone(),
                user_ids: vec![user_id],
            },
            Self::RemoveMember { org_id } => ApiOperation::RemoveOrganizationMembers {
                org_id: org_id.clone(),
                user_ids: vec![user_id],
            },
        }
    }
}

/// Result of one target in a bulk run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// Mutation applied
    Applied {
        /// Resolved user id
        user_id: String,
    },
    /// Mutation call failed
    Failed {
        /// Resolved user id
        user_id: String,
    },
    /// Target could not be resolved to a user
    NotFound,
}

/// Per-target outcomes of a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// (target, outcome) in input order
    pub outcomes: Vec<(UserLookup, BulkOutcome)>,
}

impl BulkReport {
    /// Targets attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Targets where the mutation was applied.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, BulkOutcome::Applied { .. }))
            .count()
    }
}

/// Applies mutations through the directory's executor.
pub struct RoleManager<'a> {
    directory: &'a Directory,
}

impl<'a> RoleManager<'a> {
    /// Manager over `directory`.
    pub fn new(directory: &'a Directory) -> Self {
        Self { directory }
    }

    /// Apply `action` to one user id.
    pub async fn apply(&self, user_id: &str, action: &MutationAction) -> bool {
        let description = action.describe(user_id);
        let result = self
            .directory
            .executor()
            .execute(&action.operation(user_id))
            .await;

        let success = match result {
            Ok(_) => {
                info!("Successfully completed: {}", description);
                true
            }
            Err(e) => {
                error!("Failed to {}: {}", description, e);
                false
            }
        };
        record_mutation(action.name(), success);
        success
    }

    /// Assign a global role.
    pub async fn assign_global_role(&self, user_id: &str, role_id: &str) -> bool {
        self.apply(
            user_id,
            &MutationAction::AssignGlobalRole {
                role_id: role_id.to_string(),
            },
        )
        .await
    }

    /// Remove a global role.
    pub async fn remove_global_role(&self, user_id: &str, role_id: &str) -> bool {
        self.apply(
            user_id,
            &MutationAction::RemoveGlobalRole {
                role_id: role_id.to_string(),
            },
        )
        .await
    }

    /// Assign a role within an organization.
    pub async fn assign_organization_role(&self, user_id: &str, org_id: &str, role_id: &str) -> bool {
        self.apply(
            user_id,
            &MutationAction::AssignOrgRole {
                org_id: org_id.to_string(),
                role_id: role_id.to_string(),
            },
        )
        .await
    }

    /// Remove a role within an organization.
    pub async fn remove_organization_role(&self, user_id: &str, org_id: &str, role_id: &str) -> bool {
        self.apply(
            user_id,
            &MutationAction::RemoveOrgRole {
                org_id: org_id.to_string(),
                role_id: role_id.to_string(),
            },
        )
        .await
    }

    /// Add a user to an organization.
    pub async fn add_to_organization(&self, user_id: &str, org_id: &str) -> bool {
        self.apply(
            user_id,
            &MutationAction::AddMember {
                org_id: org_id.to_string(),
            },
        )
        .await
    }

    /// Remove a user from an organization.
    pub async fn remove_from_organization(&self, user_id: &str, org_id: &str) -> bool {
        self.apply(
            user_id,
            &MutationAction::RemoveMember {
                org_id: org_id.to_string(),
            },
        )
        .await
    }

    /// Resolve each target and apply `action`, independently and in order.
    ///
    /// Stops early only when shutdown is requested.
    pub async fn apply_bulk(&self, targets: &[UserLookup], action: &MutationAction) -> BulkReport {
        let mut report = BulkReport::default();

        for target in targets {
            if self.directory.executor().is_cancelled() {
                warn!("Shutdown requested, {} targets skipped", targets.len() - report.total());
                break;
            }

            let outcome = match self.directory.resolve_user(target).await {
                Some(user) => {
                    if self.apply(&user.user_id, action).await {
                        BulkOutcome::Applied {
                            user_id: user.user_id,
                        }
                    } else {
                        BulkOutcome::Failed {
                            user_id: user.user_id,
                        }
                    }
                }
                None => {
                    warn!("Skipping {}: user not found", target);
                    BulkOutcome::NotFound
                }
            };
            report.outcomes.push((target.clone(), outcome));
        }

        report
    }
}

/// Parse a target list: one identifier per line, blank lines and `#` comments ignored.
pub fn parse_target_list(contents: &str) -> Vec<UserLookup> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(UserLookup::parse)
        .collect()
}

/// Read and parse a target file.
pub fn read_target_file(path: &Path) -> Result<Vec<UserLookup>, OutputError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        OutputError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(parse_target_list(&contents))
}
