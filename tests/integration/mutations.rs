//! Role and membership mutations against a fake tenant

use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

use auth0_export::api::{ApiOperation, ApiResponse};
use auth0_export::executor::ManualClock;
use auth0_export::export::{
    read_target_file, BulkOutcome, Directory, MutationAction, RoleManager, UserLookup,
};

use crate::common::{executor_with_retries, ok_empty, status, FakeApi};

fn tenant() -> std::sync::Arc<FakeApi> {
    FakeApi::new(|op| match op {
        ApiOperation::GetUser { user_id } if user_id.starts_with("auth0|") => {
            Ok(ApiResponse::new(json!({"user_id": user_id})))
        }
        ApiOperation::GetUser { .. } => Err(status(404)),
        ApiOperation::ListUsers { query: Some(q), .. } if q.contains("known@acme.io") => Ok(
            ApiResponse::new(json!({"users": [{"user_id": "auth0|known", "email": "known@acme.io"}]})),
        ),
        ApiOperation::ListUsers { .. } => Ok(ApiResponse::new(json!({"users": []}))),
        ApiOperation::AddUserRoles { user_id, .. } if user_id == "auth0|broken" => Err(status(400)),
        ApiOperation::AddUserRoles { .. }
        | ApiOperation::RemoveUserRoles { .. }
        | ApiOperation::AddOrganizationMemberRoles { .. }
        | ApiOperation::RemoveOrganizationMemberRoles { .. }
        | ApiOperation::AddOrganizationMembers { .. }
        | ApiOperation::RemoveOrganizationMembers { .. } => ok_empty(),
        other => panic!("unexpected operation {other:?}"),
    })
}

#[tokio::test]
async fn test_single_mutations_report_success() {
    let api = tenant();
    let directory = Directory::new(executor_with_retries(api.clone(), ManualClock::shared(), 2));
    let manager = RoleManager::new(&directory);

    assert!(manager.assign_global_role("auth0|1", "rol_admin").await);
    assert!(manager.remove_global_role("auth0|1", "rol_admin").await);
    assert!(manager.assign_organization_role("auth0|1", "org_1", "rol_m").await);
    assert!(manager.remove_organization_role("auth0|1", "org_1", "rol_m").await);
    assert!(manager.add_to_organization("auth0|1", "org_1").await);
    assert!(manager.remove_from_organization("auth0|1", "org_1").await);

    let calls = api.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0].body(), Some(json!({"roles": ["rol_admin"]})));
    assert_eq!(calls[4].body(), Some(json!({"members": ["auth0|1"]})));
    assert_eq!(calls[5].method(), reqwest::Method::DELETE);
}

#[tokio::test]
async fn test_failed_mutation_returns_false_after_retries() {
    let api = tenant();
    let directory = Directory::new(executor_with_retries(api.clone(), ManualClock::shared(), 2));

    assert!(
        !RoleManager::new(&directory)
            .assign_global_role("auth0|broken", "rol_admin")
            .await
    );
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_bulk_processes_targets_independently() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# promotion batch").unwrap();
    writeln!(file, "auth0|1").unwrap();
    writeln!(file, "known@acme.io").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "ghost@acme.io").unwrap();
    writeln!(file, "auth0|broken").unwrap();
    let targets = read_target_file(file.path()).unwrap();
    assert_eq!(targets.len(), 4);

    let api = tenant();
    let directory = Directory::new(executor_with_retries(api, ManualClock::shared(), 1));
    let report = RoleManager::new(&directory)
        .apply_bulk(
            &targets,
            &MutationAction::AssignGlobalRole {
                role_id: "rol_admin".into(),
            },
        )
        .await;

    assert_eq!(report.total(), 4);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(
        report.outcomes,
        vec![
            (
                UserLookup::Id("auth0|1".into()),
                BulkOutcome::Applied {
                    user_id: "auth0|1".into()
                }
            ),
            (
                UserLookup::Email("known@acme.io".into()),
                BulkOutcome::Applied {
                    user_id: "auth0|known".into()
                }
            ),
            (UserLookup::Email("ghost@acme.io".into()), BulkOutcome::NotFound),
            (
                UserLookup::Id("auth0|broken".into()),
                BulkOutcome::Failed {
                    user_id: "auth0|broken".into()
                }
            ),
        ]
    );
}

#[tokio::test]
async fn test_interrupt_during_quota_pause_keeps_applied_write() {
    let shutdown = auth0_export::shutdown::ShutdownCoordinator::shared();
    let api = FakeApi::new({
        let shutdown = shutdown.clone();
        move |_| {
            // Ctrl+C arrives while the server reports a nearly spent quota
            shutdown.request_shutdown();
            Ok(ApiResponse::new(serde_json::Value::Null).with_rate_limit_remaining(2))
        }
    });
    let clock = ManualClock::shared();
    let directory = Directory::new(
        executor_with_retries(api.clone(), clock.clone(), 2).with_shutdown(shutdown),
    );
    let manager = RoleManager::new(&directory);

    assert!(manager.assign_global_role("auth0|1", "rol_admin").await);
    assert_eq!(api.call_count(), 1);
    assert_eq!(clock.sleeps(), vec![std::time::Duration::from_secs(1)]);

    // The next call observes the shutdown before reaching the server
    assert!(!manager.assign_global_role("auth0|2", "rol_admin").await);
    assert_eq!(api.call_count(), 1);
}
