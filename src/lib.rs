//! # Auth0 Export Library
//!
//! Export users, organization memberships, and roles from an Auth0 tenant's
//! Management API, and manage role and membership assignments.
//!
//! ## Features
//!
//! - **Throttled Requests**: Every API call is spaced by a minimum interval that
//!   widens automatically when the tenant starts returning 429 responses
//! - **Retry with Backoff**: Exponential backoff with jitter for transient and
//!   rate-limit failures
//! - **Pagination**: Multi-page listings collapsed into one ordered collection
//! - **Graceful Degradation**: A failing sub-lookup yields an empty list instead of
//!   aborting the export
//! - **CSV and JSON Output**: Flattened one-row-per-membership tables, or nested
//!   per-user documents
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth0_export::api::http::ManagementClient;
//! use auth0_export::config::{ConfigOverrides, TenantConfig};
//! use auth0_export::executor::RequestExecutor;
//! use auth0_export::export::{Directory, RecordAggregator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TenantConfig::from_env(ConfigOverrides::default())?;
//! let client = ManagementClient::connect(&config).await?;
//! let executor = RequestExecutor::new(Arc::new(client), config.requests_per_second);
//! let directory = Directory::new(executor);
//!
//! if let Some(user) = directory.get_user_by_email("jane@acme.io").await {
//!     let record = RecordAggregator::new(&directory).aggregate(user).await;
//!     println!("{} organizations", record.metadata.total_organizations);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`executor`] - Throttle, backoff policy, and the retrying request executor
//! - [`api`] - The Management API capability, its HTTP implementation, and pagination
//! - [`export`] - Tenant lookups, record aggregation, mutations, and the export driver
//! - [`output`] - CSV table and JSON document writers
//! - [`config`] - Tenant credentials and rate configuration
//! - [`cli`] - Command-line interface

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Management API capability, HTTP client, and pagination
pub mod api;

/// CLI command implementations
pub mod cli;

/// Tenant configuration
pub mod config;

/// Throttling, backoff, and request execution
pub mod executor;

/// Lookups, aggregation, mutations, and export orchestration
pub mod export;

/// Observability metrics
pub mod metrics;

/// Export writers (CSV, JSON)
pub mod output;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Opaque field map carried by every remote record.
pub type Fields = serde_json::Map<String, Value>;

/// A user account (principal) in the tenant.
///
/// Only `user_id` and `email` are interpreted; everything else the API
/// returns is kept verbatim in `fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Auth0 user identifier (e.g. `auth0|64f...`)
    pub user_id: String,
    /// Primary email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Remaining profile fields
    #[serde(flatten)]
    pub fields: Fields,
}

impl User {
    /// Create a user with only an id and an email.
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
            fields: Fields::new(),
        }
    }

    /// Raw profile field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Profile field as a string slice, if it is a JSON string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Email for display, falling back to `N/A`.
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("N/A")
    }

    /// First linked identity (connection/provider information).
    pub fn first_identity(&self) -> Option<&Fields> {
        self.field("identities")?
            .as_array()?
            .first()?
            .as_object()
    }
}

/// An organization in the tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    /// Organization identifier (`org_...`)
    pub id: String,
    /// Machine name
    #[serde(default)]
    pub name: String,
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Free-form organization metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Fields>,
    /// Remaining fields (branding, etc.)
    #[serde(flatten)]
    pub fields: Fields,
}

impl Organization {
    /// Create an organization with an id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: None,
            metadata: None,
            fields: Fields::new(),
        }
    }
}

/// A role, either tenant-wide or held within one organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    /// Role identifier (`rol_...`)
    pub id: String,
    /// Role name
    #[serde(default)]
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub fields: Fields,
}

impl Role {
    /// Create a role with an id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            fields: Fields::new(),
        }
    }
}

/// Membership of a user in one organization, with the roles held there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationMembership {
    /// The organization
    pub organization: Organization,
    /// Organization-scoped roles held by the user
    pub roles: Vec<Role>,
}

/// Counts and timestamp computed when a record is aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportMetadata {
    /// When the record was aggregated (ISO-8601)
    pub export_timestamp: DateTime<Utc>,
    /// Number of organization memberships
    pub total_organizations: usize,
    /// Number of tenant-wide roles
    pub total_global_roles: usize,
    /// Number of organization-scoped roles across all memberships
    pub total_org_roles: usize,
}

/// Fully aggregated per-user export record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositeRecord {
    /// User profile
    pub user: User,
    /// Tenant-wide roles
    pub global_roles: Vec<Role>,
    /// Organization memberships with their roles
    pub organizations: Vec<OrganizationMembership>,
    /// Computed counts and timestamp
    pub metadata: ExportMetadata,
}

impl CompositeRecord {
    /// Assemble a record, computing counts from the supplied collections.
    pub fn new(
        user: User,
        global_roles: Vec<Role>,
        organizations: Vec<OrganizationMembership>,
        export_timestamp: DateTime<Utc>,
    ) -> Self {
        let metadata = ExportMetadata {
            export_timestamp,
            total_organizations: organizations.len(),
            total_global_roles: global_roles.len(),
            total_org_roles: organizations.iter().map(|m| m.roles.len()).sum(),
        };
        Self {
            user,
            global_roles,
            organizations,
            metadata,
        }
    }
}
