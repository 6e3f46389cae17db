//! Command-line interface for profilebook.
//!
//! This module provides the CLI structure, command arguments, and output
//! formatting for the `profbook` binary.

mod commands;
pub mod output;
pub mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    parse_assignment, parse_email, ConfigCommand, CreateCommand, DeleteCommand, EditCommand,
    ExportCommand, ExportFormatArg, FieldInput, ListCommand, LoginCommand, OutputFormat,
    PrintCommand, SearchFieldArg, StatusCommand, UserCommand, ViewCommand,
};

/// profbook - Keep a book of matrimonial profiles
///
/// Create, search, edit, delete, print, and export profiles held in a local
/// profile store.
#[derive(Debug, Parser)]
#[command(name = "profbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List profiles, newest first
    List(ListCommand),

    /// Show one profile
    View(ViewCommand),

    /// Create a profile
    Create(CreateCommand),

    /// Edit a profile
    Edit(EditCommand),

    /// Delete a profile
    Delete(DeleteCommand),

    /// Print one profile or all of them
    Print(PrintCommand),

    /// Export one profile or all of them as a document
    Export(ExportCommand),

    /// Show the profile fields in form order
    Fields,

    /// Show store and session status
    Status(StatusCommand),

    /// Sign in
    Login(LoginCommand),

    /// Sign out
    Logout,

    /// Show who is signed in
    Whoami,

    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command reads or writes profiles and so needs a signed-in user.
    #[must_use]
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Self::List(_)
                | Self::View(_)
                | Self::Create(_)
                | Self::Edit(_)
                | Self::Delete(_)
                | Self::Print(_)
                | Self::Export(_)
                | Self::User(_)
        )
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileField;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "profbook");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["profbook", "fields"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["profbook", "-v", "fields"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["profbook", "-vv", "fields"]).verbosity(), Verbosity::Debug);
        assert_eq!(parse(&["profbook", "-q", "-v", "fields"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = parse(&["profbook", "list"]);
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.search, None);
        assert_eq!(cmd.field, SearchFieldArg::Regn);
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_list_search() {
        let cli = parse(&["profbook", "list", "-s", "jan", "--field", "name", "-f", "json"]);
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.search.as_deref(), Some("jan"));
        assert_eq!(cmd.field, SearchFieldArg::Name);
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_create_assignments() {
        let cli = parse(&[
            "profbook",
            "create",
            "--set",
            "regn_number=REG001",
            "-s",
            "gender=Girl",
        ]);
        let Command::Create(cmd) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(cmd.input.assignments.len(), 2);
        assert_eq!(cmd.input.assignments[1].0, ProfileField::Gender);
    }

    #[test]
    fn test_parse_create_rejects_unknown_field() {
        assert!(Cli::try_parse_from(["profbook", "create", "--set", "nick=J"]).is_err());
    }

    #[test]
    fn test_parse_edit() {
        let cli = parse(&["profbook", "edit", "abc", "--from", "p.json"]);
        let Command::Edit(cmd) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(cmd.id, "abc");
        assert_eq!(cmd.input.from, Some(PathBuf::from("p.json")));
    }

    #[test]
    fn test_parse_print_requires_id_or_all() {
        assert!(Cli::try_parse_from(["profbook", "print"]).is_err());
        assert!(Cli::try_parse_from(["profbook", "print", "abc", "--all"]).is_err());
        assert!(Cli::try_parse_from(["profbook", "print", "--all"]).is_ok());
    }

    #[test]
    fn test_parse_export() {
        let cli = parse(&["profbook", "export", "--all", "--out", "/tmp/out"]);
        let Command::Export(cmd) = cli.command else {
            panic!("expected export");
        };
        assert!(cmd.all);
        assert_eq!(cmd.out, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_parse_export_format() {
        let cli = parse(&["profbook", "export", "abc", "-f", "html"]);
        let Command::Export(cmd) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(cmd.format, Some(ExportFormatArg::Html));
        assert_eq!(cmd.id.as_deref(), Some("abc"));

        let cli = parse(&["profbook", "export", "abc"]);
        let Command::Export(cmd) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(cmd.format, None);
    }

    #[test]
    fn test_parse_create_short_set_flag() {
        let cli = parse(&["profbook", "create", "-s", "pob=Pune"]);
        let Command::Create(cmd) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(
            cmd.input.assignments,
            vec![(ProfileField::Pob, "Pune".to_string())]
        );
    }

    #[test]
    fn test_parse_user_create() {
        let cli = parse(&[
            "profbook",
            "user",
            "create",
            "--email",
            "b@c.org",
            "--password-stdin",
        ]);
        assert!(matches!(
            cli.command,
            Command::User(UserCommand::Create {
                password_stdin: true,
                ..
            })
        ));
        assert!(cli.command.requires_session());
    }

    #[test]
    fn test_parse_delete_yes() {
        let cli = parse(&["profbook", "delete", "abc", "-y"]);
        assert!(matches!(cli.command, Command::Delete(DeleteCommand { yes: true, .. })));
    }

    #[test]
    fn test_parse_login() {
        let cli = parse(&["profbook", "login", "--email", "a@b.org"]);
        assert!(matches!(cli.command, Command::Login(_)));
        assert!(Cli::try_parse_from(["profbook", "login", "--email", "nope"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["profbook", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_requires_session() {
        assert!(parse(&["profbook", "list"]).command.requires_session());
        assert!(parse(&["profbook", "delete", "x"]).command.requires_session());
        assert!(!parse(&["profbook", "fields"]).command.requires_session());
        assert!(!parse(&["profbook", "whoami"]).command.requires_session());
        assert!(!parse(&["profbook", "config", "path"]).command.requires_session());
    }
}
