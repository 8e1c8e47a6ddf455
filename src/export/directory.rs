//! Tenant lookups
//!
//! Read-side operations over the executor. Every method degrades instead of
//! failing: lookups return `None`, listings return what was collected.

use tracing::{debug, error, info, warn};

use crate::api::{ApiError, ApiOperation, Paginator, StopRule};
use crate::executor::config::{MEMBER_ROLES_PAGE_SIZE, TOP_LEVEL_PAGE_SIZE};
use crate::executor::RequestExecutor;
use crate::{Organization, Role, User};

/// How a user is identified on the command line or in a target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    /// Auth0 user id (`provider|id`)
    Id(String),
    /// Email address
    Email(String),
}

impl UserLookup {
    /// Classify a bare identifier: `|` marks a user id, `@` an email.
    /// Anything else is treated as a user id.
    pub fn parse(identifier: &str) -> Self {
        let identifier = identifier.trim();
        if identifier.contains('|') || !identifier.contains('@') {
            Self::Id(identifier.to_string())
        } else {
            Self::Email(identifier.to_string())
        }
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(s) | Self::Email(s) => s,
        }
    }
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "user id {id}"),
            Self::Email(email) => write!(f, "email {email}"),
        }
    }
}

/// Read access to users, organizations and roles.
pub struct Directory {
    executor: RequestExecutor,
}

impl Directory {
    /// Directory over `executor`.
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// The underlying executor.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Every user in the tenant, in server order.
    pub async fn list_users(&self) -> Vec<User> {
        info!("Fetching all users...");
        let paged = Paginator::new(&self.executor)
            .collect("users", StopRule::Empty, |page| ApiOperation::ListUsers {
                page,
                per_page: TOP_LEVEL_PAGE_SIZE,
                query: None,
            })
            .await;
        info!("Total users fetched: {}", paged.items.len());
        paged.items
    }

    /// Look a user up by id.
    pub async fn get_user_by_id(&self, user_id: &str) -> Option<User> {
        let op = ApiOperation::GetUser {
            user_id: user_id.to_string(),
        };
        match self.executor.execute(&op).await.and_then(|r| r.into_record::<User>()) {
            Ok(user) => {
                debug!("Found user by ID: {}", user.display_email());
                Some(user)
            }
            Err(ApiError::Status { status: 404, .. }) => {
                warn!("No user found with ID: {}", user_id);
                None
            }
            Err(e) => {
                error!("Error fetching user by ID {}: {}", user_id, e);
                None
            }
        }
    }

    /// Look a user up by email (first match).
    pub async fn get_user_by_email(&self, email: &str) -> Option<User> {
        let op = ApiOperation::ListUsers {
            page: 0,
            per_page: 1,
            query: Some(format!("email:\"{}\"", email.replace('"', "\\\""))),
        };
        let users = self
            .executor
            .execute(&op)
            .await
            .and_then(|r| r.into_items::<User>(op.items_field()));

        match users {
            Ok(users) => match users.into_iter().next() {
                Some(user) => {
                    debug!("Found user by email: {}", email);
                    Some(user)
                }
                None => {
                    warn!("No user found with email: {}", email);
                    None
                }
            },
            Err(e) => {
                error!("Error fetching user by email {}: {}", email, e);
                None
            }
        }
    }

    /// Resolve a lookup to a user.
    pub async fn resolve_user(&self, lookup: &UserLookup) -> Option<User> {
        match lookup {
            UserLookup::Id(id) => self.get_user_by_id(id).await,
            UserLookup::Email(email) => self.get_user_by_email(email).await,
        }
    }

    /// Organizations the user belongs to (single call).
    pub async fn user_organizations(&self, user_id: &str) -> Vec<Organization> {
        let op = ApiOperation::ListUserOrganizations {
            user_id: user_id.to_string(),
            per_page: TOP_LEVEL_PAGE_SIZE,
        };
        match self
            .executor
            .execute(&op)
            .await
            .and_then(|r| r.into_items::<Organization>(op.items_field()))
        {
            Ok(orgs) => {
                debug!("Organizations for user {}: {} found", user_id, orgs.len());
                orgs
            }
            Err(e) => {
                error!("Error fetching organizations for user {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// Tenant-wide roles assigned to the user (single call).
    pub async fn user_roles(&self, user_id: &str) -> Vec<Role> {
        let op = ApiOperation::ListUserRoles {
            user_id: user_id.to_string(),
            per_page: TOP_LEVEL_PAGE_SIZE,
        };
        match self
            .executor
            .execute(&op)
            .await
            .and_then(|r| r.into_items::<Role>(op.items_field()))
        {
            Ok(roles) => roles,
            Err(e) => {
                error!("Error fetching global roles for user {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// Roles the user holds inside one organization (paginated, short-page stop).
    pub async fn user_organization_roles(&self, user_id: &str, org_id: &str) -> Vec<Role> {
        let label = format!("roles of {user_id} in {org_id}");
        Paginator::new(&self.executor)
            .collect(
                &label,
                StopRule::Short {
                    page_size: MEMBER_ROLES_PAGE_SIZE,
                },
                |page| ApiOperation::ListOrganizationMemberRoles {
                    org_id: org_id.to_string(),
                    user_id: user_id.to_string(),
                    page,
                    per_page: MEMBER_ROLES_PAGE_SIZE,
                },
            )
            .await
            .items
    }

    /// Every role defined in the tenant.
    pub async fn available_roles(&self) -> Vec<Role> {
        let roles = Paginator::new(&self.executor)
            .collect("roles", StopRule::Empty, |page| ApiOperation::ListRoles {
                page,
                per_page: TOP_LEVEL_PAGE_SIZE,
            })
            .await
            .items;
        info!("Found {} available roles", roles.len());
        roles
    }

    /// Every organization defined in the tenant.
    pub async fn available_organizations(&self) -> Vec<Organization> {
        let orgs = Paginator::new(&self.executor)
            .collect("organizations", StopRule::Empty, |page| {
                ApiOperation::ListOrganizations {
                    page,
                    per_page: TOP_LEVEL_PAGE_SIZE,
                }
            })
            .await
            .items;
        info!("Found {} available organizations", orgs.len());
        orgs
    }
}
