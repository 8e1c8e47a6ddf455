//! Role and membership mutation commands
//!
//! One action per invocation, applied to each target in order.

use clap::{Args, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use super::{Cli, CliError, OutputFormat};
use crate::export::{
    read_target_file, BulkOutcome, BulkReport, MutationAction, RoleManager, UserLookup,
};
use crate::shutdown::SharedShutdown;

/// Users to act on
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target user id (repeatable)
    #[arg(long = "user-id")]
    pub user_ids: Vec<String>,

    /// Target email (repeatable)
    #[arg(long = "email")]
    pub emails: Vec<String>,

    /// File with one user id or email per line (`#` starts a comment)
    #[arg(long)]
    pub from_file: Option<PathBuf>,
}

impl TargetArgs {
    /// Collect targets: ids, then emails, then file entries.
    pub fn collect(&self) -> Result<Vec<UserLookup>, CliError> {
        let mut targets: Vec<UserLookup> = self
            .user_ids
            .iter()
            .map(|id| UserLookup::Id(id.clone()))
            .chain(self.emails.iter().map(|e| UserLookup::Email(e.clone())))
            .collect();
        if let Some(path) = &self.from_file {
            targets.extend(read_target_file(path)?);
        }
        if targets.is_empty() {
            return Err(CliError::InvalidArgument(
                "no target users: pass --user-id, --email, or --from-file".to_string(),
            ));
        }
        Ok(targets)
    }
}

/// Mutation subcommands
#[derive(Subcommand, Debug)]
pub enum MutateCommand {
    /// Assign a tenant-wide role
    AssignGlobalRole {
        /// Role id
        #[arg(long)]
        role_id: String,
        /// Targets
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Remove a tenant-wide role
    RemoveGlobalRole {
        /// Role id
        #[arg(long)]
        role_id: String,
        /// Targets
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Assign a role within an organization
    AssignOrgRole {
        /// Organization id
        #[arg(long)]
        org_id: String,
        /// Role id
        #[arg(long)]
        role_id: String,
        /// Targets
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Remove a role within an organization
    RemoveOrgRole {
        /// Organization id
        #[arg(long)]
        org_id: String,
        /// Role id
        #[arg(long)]
        role_id: String,
        /// Targets
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Add users to an organization
    AddMember {
        /// Organization id
        #[arg(long)]
        org_id: String,
        /// Targets
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Remove users from an organization
    RemoveMember {
        /// Organization id
        #[arg(long)]
        org_id: String,
        /// Targets
        #[command(flatten)]
        targets: TargetArgs,
    },
}

impl MutateCommand {
    /// The action and its targets.
    pub fn action(&self) -> (MutationAction, &TargetArgs) {
        match self {
            Self::AssignGlobalRole { role_id, targets } => (
                MutationAction::AssignGlobalRole {
                    role_id: role_id.clone(),
                },
                targets,
            ),
            Self::RemoveGlobalRole { role_id, targets } => (
                MutationAction::RemoveGlobalRole {
                    role_id: role_id.clone(),
                },
                targets,
            ),
            Self::AssignOrgRole {
                org_id,
                role_id,
                targets,
            } => (
                MutationAction::AssignOrgRole {
                    org_id: org_id.clone(),
                    role_id: role_id.clone(),
                },
                targets,
            ),
            Self::RemoveOrgRole {
                org_id,
                role_id,
                targets,
            } => (
                MutationAction::RemoveOrgRole {
                    org_id: org_id.clone(),
                    role_id: role_id.clone(),
                },
                targets,
            ),
            Self::AddMember { org_id, targets } => (
                MutationAction::AddMember {
                    org_id: org_id.clone(),
                },
                targets,
            ),
            Self::RemoveMember { org_id, targets } => (
                MutationAction::RemoveMember {
                    org_id: org_id.clone(),
                },
                targets,
            ),
        }
    }

    /// Apply the action to every target and print per-target outcomes.
    ///
    /// Failed mutations do not fail the command; only an interrupt does.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let (action, targets) = self.action();
        let targets = targets.collect()?;
        let session = cli.connect(shutdown).await?;

        let report = RoleManager::new(&session.directory)
            .apply_bulk(&targets, &action)
            .await;

        match cli.output_format {
            OutputFormat::Json => println!("{}", report_json(&action, &report)),
            OutputFormat::Human => println!("{}", render_report(&action, &report)),
        }

        if session.directory.executor().is_cancelled() {
            return Err(crate::api::ApiError::Cancelled.into());
        }
        Ok(())
    }
}

fn outcome_label(outcome: &BulkOutcome) -> &'static str {
    match outcome {
        BulkOutcome::Applied { .. } => "ok",
        BulkOutcome::Failed { .. } => "failed",
        BulkOutcome::NotFound => "not found",
    }
}

/// Human report: one line per target, then `success/total`.
pub fn render_report(action: &MutationAction, report: &BulkReport) -> String {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|(target, outcome)| match outcome {
            BulkOutcome::Applied { user_id } | BulkOutcome::Failed { user_id } => {
                format!("[{}] {} ({})", outcome_label(outcome), target.as_str(), user_id)
            }
            BulkOutcome::NotFound => format!("[{}] {}", outcome_label(outcome), target.as_str()),
        })
        .collect();
    lines.push(format!(
        "\nSummary: {}/{} {} actions completed successfully",
        report.succeeded(),
        report.total(),
        action.name()
    ));
    lines.join("\n")
}

fn report_json(action: &MutationAction, report: &BulkReport) -> serde_json::Value {
    json!({
        "action": action.name(),
        "succeeded": report.succeeded(),
        "total": report.total(),
        "results": report.outcomes.iter().map(|(target, outcome)| {
            let user_id = match outcome {
                BulkOutcome::Applied { user_id } | BulkOutcome::Failed { user_id } => Some(user_id),
                BulkOutcome::NotFound => None,
            };
            json!({
                "target": target.as_str(),
                "user_id": user_id,
                "outcome": outcome_label(outcome),
            })
        }).collect::<Vec<_>>(),
    })
}
