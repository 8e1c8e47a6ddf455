//! Unit tests for command-line parsing

use clap::Parser;

use auth0_export::cli::mutate::MutateCommand;
use auth0_export::cli::user::UserFormat;
use auth0_export::cli::{Cli, Commands, ListCommand, OutputFormat};
use auth0_export::export::{MutationAction, UserLookup};
use auth0_export::output::ExportFormat;

#[test]
fn test_defaults() {
    let cli = Cli::parse_from(["auth0-export", "export"]);
    assert_eq!(cli.max_retries, 5);
    assert_eq!(cli.output_format, OutputFormat::Human);
    assert!(!cli.quiet);
    assert!(cli.metrics_addr.is_none());
    match cli.command {
        Commands::Export(args) => {
            assert_eq!(args.format, ExportFormat::Csv);
            assert!(args.output.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "auth0-export",
        "export",
        "--format",
        "json",
        "-o",
        "out.json",
        "-r",
        "0.5",
        "--max-retries",
        "8",
        "--domain",
        "acme.auth0.com",
    ]);
    assert_eq!(cli.max_retries, 8);
    assert_eq!(cli.connection.rate_limit, Some(0.5));
    let overrides = cli.connection.overrides();
    assert_eq!(overrides.domain.as_deref(), Some("acme.auth0.com"));
    assert_eq!(overrides.requests_per_second, Some(0.5));
}

#[test]
fn test_max_retries_range() {
    assert!(Cli::try_parse_from(["auth0-export", "--max-retries", "0", "export"]).is_err());
    assert!(Cli::try_parse_from(["auth0-export", "--max-retries", "11", "export"]).is_err());
}

#[test]
fn test_user_requires_exactly_one_target() {
    assert!(Cli::try_parse_from(["auth0-export", "user"]).is_err());
    assert!(Cli::try_parse_from([
        "auth0-export",
        "user",
        "--user-id",
        "auth0|1",
        "--email",
        "a@b.io"
    ])
    .is_err());

    let cli = Cli::parse_from(["auth0-export", "user", "--email", "a@b.io", "--format", "json"]);
    match cli.command {
        Commands::User(args) => {
            assert_eq!(args.format, UserFormat::Json);
            assert_eq!(args.lookup().unwrap(), UserLookup::Email("a@b.io".into()));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_list_subcommands() {
    let cli = Cli::parse_from(["auth0-export", "list", "roles", "--output-format", "json"]);
    assert_eq!(cli.output_format, OutputFormat::Json);
    assert!(matches!(cli.command, Commands::List(ListCommand::Roles)));
}

#[test]
fn test_org_mutation_requires_org_id() {
    assert!(Cli::try_parse_from([
        "auth0-export",
        "mutate",
        "assign-org-role",
        "--role-id",
        "rol_1",
        "--user-id",
        "auth0|1"
    ])
    .is_err());

    let cli = Cli::parse_from([
        "auth0-export",
        "mutate",
        "assign-org-role",
        "--org-id",
        "org_1",
        "--role-id",
        "rol_1",
        "--user-id",
        "auth0|1",
        "--user-id",
        "auth0|2",
        "--email",
        "c@d.io",
    ]);
    let Commands::Mutate(command) = &cli.command else {
        panic!("expected mutate command");
    };
    let (action, targets) = command.action();
    assert_eq!(
        action,
        MutationAction::AssignOrgRole {
            org_id: "org_1".into(),
            role_id: "rol_1".into()
        }
    );
    assert_eq!(targets.collect().unwrap().len(), 3);
    assert!(matches!(command, MutateCommand::AssignOrgRole { .. }));
}
