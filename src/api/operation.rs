//! Management API operations
//!
//! Each variant describes one remote call: method, path, query and body.
//! The HTTP client turns these into requests; scripted fakes match on them.

use reqwest::Method;
use serde_json::{json, Value};

/// One call against the Management API v2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOperation {
    /// `GET /users`, optionally filtered with a Lucene query
    ListUsers {
        /// Zero-based page index
        page: u32,
        /// Page size
        per_page: u32,
        /// `q` search expression
        query: Option<String>,
    },
    /// `GET /users/{id}`
    GetUser {
        /// User id
        user_id: String,
    },
    /// `GET /users/{id}/organizations`
    ListUserOrganizations {
        /// User id
        user_id: String,
        /// Page size of the single call
        per_page: u32,
    },
    /// `GET /users/{id}/roles`
    ListUserRoles {
        /// User id
        user_id: String,
        /// Page size of the single call
        per_page: u32,
    },
    /// `GET /organizations/{org}/members/{user}/roles`
    ListOrganizationMemberRoles {
        /// Organization id
        org_id: String,
        /// User id
        user_id: String,
        /// Zero-based page index
        page: u32,
        /// Page size
        per_page: u32,
    },
    /// `POST /users/{id}/roles`
    AddUserRoles {
        /// User id
        user_id: String,
        /// Role ids to assign
        role_ids: Vec<String>,
    },
    /// `DELETE /users/{id}/roles`
    RemoveUserRoles {
        /// User id
        user_id: String,
        /// Role ids to remove
        role_ids: Vec<String>,
    },
    /// `POST /organizations/{org}/members/{user}/roles`
    AddOrganizationMemberRoles {
        /// Organization id
        org_id: String,
        /// User id
        user_id: String,
        /// Role ids to assign
        role_ids: Vec<String>,
    },
    /// `DELETE /organizations/{org}/members/{user}/roles`
    RemoveOrganizationMemberRoles {
        /// Organization id
        org_id: String,
        /// User id
        user_id: String,
        /// Role ids to remove
        role_ids: Vec<String>,
    },
    /// `POST /organizations/{org}/members`
    AddOrganizationMembers {
        /// Organization id
        org_id: String,
        /// User ids to add
        user_ids: Vec<String>,
    },
    /// `DELETE /organizations/{org}/members`
    RemoveOrganizationMembers {
        /// Organization id
        org_id: String,
        /// User ids to remove
        user_ids: Vec<String>,
    },
    /// `GET /roles`
    ListRoles {
        /// Zero-based page index
        page: u32,
        /// Page size
        per_page: u32,
    },
    /// `GET /organizations`
    ListOrganizations {
        /// Zero-based page index
        page: u32,
        /// Page size
        per_page: u32,
    },
}

impl ApiOperation {
    /// HTTP method.
    pub fn method(&self) -> Method {
        match self {
            Self::AddUserRoles { .. }
            | Self::AddOrganizationMemberRoles { .. }
            | Self::AddOrganizationMembers { .. } => Method::POST,
            Self::RemoveUserRoles { .. }
            | Self::RemoveOrganizationMemberRoles { .. }
            | Self::RemoveOrganizationMembers { .. } => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// Unencoded path segments below `/api/v2/`.
    pub fn path_segments(&self) -> Vec<&str> {
        match self {
            Self::ListUsers { .. } => vec!["users"],
            Self::GetUser { user_id } => vec!["users", user_id.as_str()],
            Self::ListUserOrganizations { user_id, .. } => vec!["users", user_id.as_str(), "organizations"],
            Self::ListUserRoles { user_id, .. }
            | Self::AddUserRoles { user_id, .. }
            | Self::RemoveUserRoles { user_id, .. } => vec!["users", user_id.as_str(), "roles"],
            Self::ListOrganizationMemberRoles {
                org_id, user_id, ..
            }
            | Self::AddOrganizationMemberRoles {
                org_id, user_id, ..
            }
            | Self::RemoveOrganizationMemberRoles {
                org_id, user_id, ..
            } => vec!["organizations", org_id.as_str(), "members", user_id.as_str(), "roles"],
            Self::AddOrganizationMembers { org_id, .. }
            | Self::RemoveOrganizationMembers { org_id, .. } => {
                vec!["organizations", org_id.as_str(), "members"]
            }
            Self::ListRoles { .. } => vec!["roles"],
            Self::ListOrganizations { .. } => vec!["organizations"],
        }
    }

    /// Query parameters.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let paged = |page: u32, per_page: u32| {
            vec![
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("include_totals", "true".to_string()),
            ]
        };

        match self {
            Self::ListUsers {
                page,
                per_page,
                query,
            } => {
                let mut params = paged(*page, *per_page);
                if let Some(q) = query {
                    params.push(("q", q.clone()));
                    params.push(("search_engine", "v3".to_string()));
                }
                params
            }
            Self::ListUserOrganizations { per_page, .. } | Self::ListUserRoles { per_page, .. } => {
                paged(0, *per_page)
            }
            Self::ListOrganizationMemberRoles { page, per_page, .. }
            | Self::ListRoles { page, per_page }
            | Self::ListOrganizations { page, per_page } => paged(*page, *per_page),
            _ => Vec::new(),
        }
    }

    /// JSON body for mutations.
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::AddUserRoles { role_ids, .. }
            | Self::RemoveUserRoles { role_ids, .. }
            | Self::AddOrganizationMemberRoles { role_ids, .. }
            | Self::RemoveOrganizationMemberRoles { role_ids, .. } => {
                Some(json!({ "roles": role_ids }))
            }
            Self::AddOrganizationMembers { user_ids, .. }
            | Self::RemoveOrganizationMembers { user_ids, .. } => {
                Some(json!({ "members": user_ids }))
            }
            _ => None,
        }
    }

    /// Response field holding the listed items, for listing operations.
    pub fn items_field(&self) -> Option<&'static str> {
        match self {
            Self::ListUsers { .. } => Some("users"),
            Self::ListUserOrganizations { .. } | Self::ListOrganizations { .. } => {
                Some("organizations")
            }
            Self::ListUserRoles { .. }
            | Self::ListOrganizationMemberRoles { .. }
            | Self::ListRoles { .. } => Some("roles"),
            _ => None,
        }
    }

    /// Short name used in logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListUsers { .. } => "list_users",
            Self::GetUser { .. } => "get_user",
            Self::ListUserOrganizations { .. } => "list_user_organizations",
            Self::ListUserRoles { .. } => "list_user_roles",
            Self::ListOrganizationMemberRoles { .. } => "list_organization_member_roles",
            Self::AddUserRoles { .. } => "add_user_roles",
            Self::RemoveUserRoles { .. } => "remove_user_roles",
            Self::AddOrganizationMemberRoles { .. } => "add_organization_member_roles",
            Self::RemoveOrganizationMemberRoles { .. } => "remove_organization_member_roles",
            Self::AddOrganizationMembers { .. } => "add_organization_members",
            Self::RemoveOrganizationMembers { .. } => "remove_organization_members",
            Self::ListRoles { .. } => "list_roles",
            Self::ListOrganizations { .. } => "list_organizations",
        }
    }
}
