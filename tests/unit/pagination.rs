//! Unit tests for page-index pagination

use serde_json::json;

use auth0_export::api::{ApiOperation, Paginator, StopRule};
use auth0_export::executor::ManualClock;
use auth0_export::{Role, User};

use crate::common::{executor, roles_page, status, users_page, FakeApi};

fn member_roles_op(page: u32) -> ApiOperation {
    ApiOperation::ListOrganizationMemberRoles {
        org_id: "org_1".into(),
        user_id: "auth0|1".into(),
        page,
        per_page: 50,
    }
}

fn users_op(page: u32) -> ApiOperation {
    ApiOperation::ListUsers {
        page,
        per_page: 100,
        query: None,
    }
}

#[tokio::test]
async fn test_short_page_stops_sub_resource_listing() {
    let api = FakeApi::scripted(vec![
        Ok(roles_page("r", 0, 50)),
        Ok(roles_page("r", 50, 50)),
        Ok(roles_page("r", 100, 30)),
        Ok(roles_page("r", 130, 50)),
    ]);
    let exec = executor(api.clone(), ManualClock::shared());

    let paged = Paginator::new(&exec)
        .collect::<Role, _>("member roles", StopRule::Short { page_size: 50 }, member_roles_op)
        .await;

    assert_eq!(paged.items.len(), 130);
    assert_eq!(paged.pages_fetched, 3);
    assert!(!paged.truncated);
    assert_eq!(api.call_count(), 3);
    assert_eq!(paged.items[129].name, "r-129");
}

#[tokio::test]
async fn test_empty_page_stops_top_level_listing() {
    let api = FakeApi::scripted(vec![
        Ok(users_page(0, 100)),
        Ok(users_page(100, 100)),
        Ok(users_page(200, 0)),
    ]);
    let exec = executor(api.clone(), ManualClock::shared());

    let paged = Paginator::new(&exec)
        .collect::<User, _>("users", StopRule::Empty, users_op)
        .await;

    assert_eq!(paged.items.len(), 200);
    assert_eq!(paged.pages_fetched, 3);
    let pages: Vec<u32> = api
        .calls()
        .iter()
        .map(|op| match op {
            ApiOperation::ListUsers { page, .. } => *page,
            other => panic!("unexpected operation {other:?}"),
        })
        .collect();
    assert_eq!(pages, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_failure_returns_partial_result() {
    let api = FakeApi::new(|op| match op {
        ApiOperation::ListUsers { page: 0, .. } => Ok(users_page(0, 100)),
        _ => Err(status(503)),
    });
    let exec = executor(api, ManualClock::shared());

    let paged = Paginator::new(&exec)
        .collect::<User, _>("users", StopRule::Empty, users_op)
        .await;

    assert_eq!(paged.items.len(), 100);
    assert!(paged.truncated);
}

#[tokio::test]
async fn test_bare_array_and_missing_field() {
    let api = FakeApi::scripted(vec![
        Ok(crate::common::array(vec![json!({"id": "rol_1", "name": "Admin"})])),
        Ok(auth0_export::api::ApiResponse::new(json!({"total": 0}))),
    ]);
    let exec = executor(api, ManualClock::shared());

    let paged = Paginator::new(&exec)
        .collect::<Role, _>("roles", StopRule::Empty, |page| ApiOperation::ListRoles {
            page,
            per_page: 100,
        })
        .await;

    assert_eq!(paged.items, vec![Role::new("rol_1", "Admin")]);
    assert_eq!(paged.pages_fetched, 2);
}
