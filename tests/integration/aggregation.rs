//! Aggregation of users, organizations, and roles over a fake tenant

use serde_json::json;
use std::collections::BTreeSet;

use auth0_export::api::{ApiOperation, ApiResponse};
use auth0_export::executor::ManualClock;
use auth0_export::export::{Directory, RecordAggregator};
use auth0_export::output::{flatten_record, BASE_COLUMNS};
use auth0_export::User;

use crate::common::{array, executor, status, FakeApi};

/// One user (`auth0|1`) in two organizations with one role each, plus one global role.
pub fn two_org_tenant() -> std::sync::Arc<FakeApi> {
    FakeApi::new(|op| match op {
        ApiOperation::ListUserOrganizations { .. } => Ok(array(vec![
            json!({"id": "org_a", "name": "alpha", "display_name": "Alpha"}),
            json!({"id": "org_b", "name": "beta", "display_name": "Beta"}),
        ])),
        ApiOperation::ListUserRoles { .. } => Ok(array(vec![json!({"id": "rol_g", "name": "Global Admin"})])),
        ApiOperation::ListOrganizationMemberRoles { org_id, .. } => Ok(ApiResponse::new(json!({
            "roles": [{"id": format!("rol_{org_id}"), "name": format!("{org_id} member")}]
        }))),
        other => panic!("unexpected operation {other:?}"),
    })
}

#[tokio::test]
async fn test_user_without_organizations() {
    let api = FakeApi::new(|op| match op {
        ApiOperation::ListUserOrganizations { .. } => Ok(array(vec![])),
        ApiOperation::ListUserRoles { .. } => Ok(array(vec![])),
        other => panic!("unexpected operation {other:?}"),
    });
    let directory = Directory::new(executor(api.clone(), ManualClock::shared()));

    let record = RecordAggregator::new(&directory)
        .aggregate(User::new("auth0|1", None))
        .await;

    assert_eq!(record.metadata.total_organizations, 0);
    assert_eq!(record.metadata.total_global_roles, 0);
    assert!(record.organizations.is_empty());
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_two_organizations_one_role_each() {
    let api = two_org_tenant();
    let directory = Directory::new(executor(api.clone(), ManualClock::shared()));

    let record = RecordAggregator::new(&directory)
        .aggregate(User::new("auth0|1", Some("jane@acme.io".into())))
        .await;

    assert_eq!(record.metadata.total_organizations, 2);
    assert_eq!(record.metadata.total_global_roles, 1);
    assert_eq!(record.metadata.total_org_roles, 2);

    let names: Vec<&str> = api.calls().iter().map(|op| op.name()).collect();
    assert_eq!(
        names,
        vec![
            "list_user_organizations",
            "list_user_roles",
            "list_organization_member_roles",
            "list_organization_member_roles"
        ]
    );

    let rows = flatten_record(&record);
    assert_eq!(rows.len(), 2);
    let differing: BTreeSet<&str> = BASE_COLUMNS
        .iter()
        .copied()
        .filter(|c| rows[0].get(c) != rows[1].get(c))
        .collect();
    assert_eq!(
        differing,
        BTreeSet::from([
            "Organization ID",
            "Organization Name",
            "Organization Display Name",
            "Organization Roles"
        ])
    );
}

#[tokio::test]
async fn test_failed_sub_lookup_contributes_empty_list() {
    let api = FakeApi::new(|op| match op {
        ApiOperation::ListUserOrganizations { .. } => Ok(array(vec![json!({"id": "org_a", "name": "alpha"})])),
        ApiOperation::ListUserRoles { .. } => Err(status(500)),
        ApiOperation::ListOrganizationMemberRoles { .. } => Err(status(403)),
        other => panic!("unexpected operation {other:?}"),
    });
    let directory = Directory::new(executor(api, ManualClock::shared()));

    let record = RecordAggregator::new(&directory)
        .aggregate(User::new("auth0|1", None))
        .await;

    assert_eq!(record.metadata.total_organizations, 1);
    assert!(record.global_roles.is_empty());
    assert!(record.organizations[0].roles.is_empty());
}

#[tokio::test]
async fn test_lookup_by_email_and_id() {
    let api = FakeApi::new(|op| match op {
        ApiOperation::ListUsers { query: Some(q), per_page: 1, .. } => {
            assert_eq!(q, "email:\"jane@acme.io\"");
            Ok(ApiResponse::new(json!({"users": [{"user_id": "auth0|7", "email": "jane@acme.io"}]})))
        }
        ApiOperation::GetUser { user_id } if user_id == "auth0|7" => {
            Ok(ApiResponse::new(json!({"user_id": "auth0|7"})))
        }
        ApiOperation::GetUser { .. } => Err(status(404)),
        other => panic!("unexpected operation {other:?}"),
    });
    let directory = Directory::new(executor(api.clone(), ManualClock::shared()));

    let by_email = directory.get_user_by_email("jane@acme.io").await.unwrap();
    assert_eq!(by_email.user_id, "auth0|7");
    assert!(directory.get_user_by_id("auth0|7").await.is_some());

    let calls_before = api.call_count();
    assert!(directory.get_user_by_id("auth0|missing").await.is_none());
    // a 404 is still retried like any other error before giving up
    assert_eq!(api.call_count() - calls_before, 5);
}
