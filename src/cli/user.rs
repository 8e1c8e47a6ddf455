//! Single-user query command

use clap::{ArgGroup, Args, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use super::{Cli, CliError, OutputFormat};
use crate::export::{RecordAggregator, UserLookup};
use crate::output::path::default_single_user_path;
use crate::output::write_single_record;
use crate::shutdown::SharedShutdown;
use crate::CompositeRecord;

/// How to present the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserFormat {
    /// Summary tables on stdout
    Table,
    /// Single-object JSON file
    Json,
}

/// Arguments for a single-user query
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["user_id", "email"])))]
pub struct UserArgs {
    /// Auth0 user id (e.g. auth0|123...)
    #[arg(long)]
    pub user_id: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Presentation format
    #[arg(long, value_enum, default_value_t = UserFormat::Table)]
    pub format: UserFormat,

    /// Print the full record as pretty JSON
    #[arg(long, default_value_t = false)]
    pub json_pretty: bool,

    /// Output file for --format json
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl UserArgs {
    /// The lookup named on the command line.
    pub fn lookup(&self) -> Result<UserLookup, CliError> {
        match (&self.user_id, &self.email) {
            (Some(id), None) => Ok(UserLookup::Id(id.clone())),
            (None, Some(email)) => Ok(UserLookup::Email(email.clone())),
            _ => Err(CliError::InvalidArgument(
                "specify exactly one of --user-id or --email".to_string(),
            )),
        }
    }

    /// Look the user up, aggregate, and present.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let lookup = self.lookup()?;
        let session = cli.connect(shutdown).await?;

        let user = session
            .directory
            .resolve_user(&lookup)
            .await
            .ok_or_else(|| CliError::UserNotFound(lookup.to_string()))?;
        info!("Found user: {}", user.display_email());

        let record = RecordAggregator::new(&session.directory)
            .aggregate(user)
            .await;

        if self.json_pretty {
            println!("{}", serde_json::to_string_pretty(&record)?);
            return Ok(());
        }

        match self.format {
            UserFormat::Json => {
                let path = self
                    .output
                    .clone()
                    .unwrap_or_else(|| default_single_user_path(&record.user.user_id));
                let path = write_single_record(&path, &record)?;
                match cli.output_format {
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({
                            "success": true,
                            "user_id": record.user.user_id,
                            "output_path": path.display().to_string(),
                        })
                    ),
                    OutputFormat::Human => {
                        println!("User exported to JSON: {}", path.display())
                    }
                }
            }
            UserFormat::Table => print!("{}", render_user(&record)),
        }
        Ok(())
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

/// Plain-text summary of one record.
pub fn render_user(record: &CompositeRecord) -> String {
    let user = &record.user;
    let mut lines: Vec<String> = Vec::new();

    let flag = |key: &str| {
        user.field(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
            .to_string()
    };
    let logins = user
        .field("logins_count")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);

    lines.push("User Information".to_string());
    lines.push(format!("  User ID:        {}", user.user_id));
    lines.push(format!("  Email:          {}", user.display_email()));
    lines.push(format!("  Name:           {}", or_na(user.str_field("name"))));
    lines.push(format!("  Nickname:       {}", or_na(user.str_field("nickname"))));
    lines.push(format!("  Email Verified: {}", flag("email_verified")));
    lines.push(format!("  Blocked:        {}", flag("blocked")));
    lines.push(format!("  Created:        {}", or_na(user.str_field("created_at"))));
    lines.push(format!("  Updated:        {}", or_na(user.str_field("updated_at"))));
    lines.push(format!("  Last Login:     {}", or_na(user.str_field("last_login"))));
    lines.push(format!("  Login Count:    {logins}"));
    if let Some(identity) = user.first_identity() {
        let get = |key: &str| identity.get(key).and_then(|v| v.as_str());
        lines.push(format!("  Connection:     {}", or_na(get("connection"))));
        lines.push(format!("  Provider:       {}", or_na(get("provider"))));
    }

    lines.push(String::new());
    if record.global_roles.is_empty() {
        lines.push("Global Roles: None".to_string());
    } else {
        lines.push("Global Roles".to_string());
        for role in &record.global_roles {
            lines.push(format!("  - {} ({})", role.name, role.id));
        }
    }

    lines.push(String::new());
    if record.organizations.is_empty() {
        lines.push("Organizations: None".to_string());
    } else {
        lines.push("Organization Memberships".to_string());
        for membership in &record.organizations {
            let org = &membership.organization;
            let roles = if membership.roles.is_empty() {
                "None".to_string()
            } else {
                membership
                    .roles
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            lines.push(format!(
                "  - {} ({}) [{}]",
                org.name,
                org.display_name.as_deref().unwrap_or("N/A"),
                org.id
            ));
            lines.push(format!("    Roles: {roles}"));
        }
    }

    let meta = &record.metadata;
    lines.push(String::new());
    lines.push("Summary".to_string());
    lines.push(format!("  Organizations: {}", meta.total_organizations));
    lines.push(format!("  Global Roles:  {}", meta.total_global_roles));
    lines.push(format!("  Org Roles:     {}", meta.total_org_roles));
    lines.push(format!("  Export Time:   {}", meta.export_timestamp.to_rfc3339()));
    lines.push(String::new());
    lines.join("\n")
}
