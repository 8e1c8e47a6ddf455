//! Read-only listing of tenant roles and organizations

use clap::Subcommand;
use serde_json::json;

use super::{Cli, CliError, OutputFormat};
use crate::shutdown::SharedShutdown;
use crate::{Organization, Role};

/// Longest description shown in the human role listing.
const DESCRIPTION_WIDTH: usize = 60;

/// List subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    /// Tenant roles
    Roles,
    /// Tenant organizations
    Organizations,
}

impl ListCommand {
    /// Fetch and print.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let session = cli.connect(shutdown).await?;
        let output = match self {
            ListCommand::Roles => {
                let roles = session.directory.available_roles().await;
                match cli.output_format {
                    OutputFormat::Json => serde_json::to_string_pretty(&roles)?,
                    OutputFormat::Human => render_roles(&roles),
                }
            }
            ListCommand::Organizations => {
                let orgs = session.directory.available_organizations().await;
                match cli.output_format {
                    OutputFormat::Json => serde_json::to_string_pretty(
                        &orgs
                            .iter()
                            .map(|o| json!({"id": o.id, "name": o.name, "display_name": o.display_name}))
                            .collect::<Vec<_>>(),
                    )?,
                    OutputFormat::Human => render_organizations(&orgs),
                }
            }
        };
        println!("{output}");
        Ok(())
    }
}

/// Cut to `DESCRIPTION_WIDTH` characters, marking the cut with "...".
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_WIDTH {
        let head: String = description.chars().take(DESCRIPTION_WIDTH).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

/// One line per role: name, id, truncated description.
pub fn render_roles(roles: &[Role]) -> String {
    if roles.is_empty() {
        return "No roles found.".to_string();
    }
    let mut lines: Vec<String> = roles
        .iter()
        .map(|role| {
            let description = role
                .description
                .as_deref()
                .map(truncate_description)
                .unwrap_or_else(|| "No description".to_string());
            format!("{} | {} | {}", role.name, role.id, description)
        })
        .collect();
    lines.push(format!("\nFound {} roles total", roles.len()));
    lines.join("\n")
}

/// One line per organization: name, display name, id.
pub fn render_organizations(orgs: &[Organization]) -> String {
    if orgs.is_empty() {
        return "No organizations found.".to_string();
    }
    let mut lines: Vec<String> = orgs
        .iter()
        .map(|org| {
            format!(
                "{} | {} | {}",
                org.name,
                org.display_name.as_deref().unwrap_or("N/A"),
                org.id
            )
        })
        .collect();
    lines.push(format!("\nFound {} organizations total", orgs.len()));
    lines.join("\n")
}
