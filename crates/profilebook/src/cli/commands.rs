//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::profile::{ProfileField, ProfilePatch};
use crate::render::ExportFormat;
use crate::search::SearchField;
use crate::session::is_valid_email;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show profiles whose selected field contains this text
    #[arg(short, long, value_name = "TERM")]
    pub search: Option<String>,

    /// Field the search term is matched against
    #[arg(long, value_enum, default_value = "regn")]
    pub field: SearchFieldArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// View command arguments.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Profile identifier
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Field values supplied on the command line or from a file.
#[derive(Debug, Args)]
pub struct FieldInput {
    /// Set a field, e.g. --set full_name_with_surname="Jane Doe" (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(ProfileField, String)>,

    /// Read field values from a JSON object keyed by field name
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,
}

impl FieldInput {
    /// The `--set` values as a patch. File values are merged by the caller.
    #[must_use]
    pub fn assignment_patch(&self) -> ProfilePatch {
        let mut patch = ProfilePatch::new();
        for (field, value) in &self.assignments {
            patch.set(*field, value.clone());
        }
        patch
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.from.is_none()
    }
}

/// Create command arguments.
#[derive(Debug, Args)]
pub struct CreateCommand {
    #[command(flatten)]
    pub input: FieldInput,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Profile identifier
    pub id: String,

    #[command(flatten)]
    pub input: FieldInput,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Profile identifier
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Print command arguments.
#[derive(Debug, Args)]
pub struct PrintCommand {
    /// Profile identifier
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Print every profile, one page each
    #[arg(short, long)]
    pub all: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Profile identifier
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Export every profile into one document
    #[arg(short, long)]
    pub all: bool,

    /// Directory to write the document to
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Document format (defaults to the configured format, PDF unless set)
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormatArg>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address to sign in as
    #[arg(short, long, value_parser = parse_email)]
    pub email: String,

    /// Read the password from the first line of stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

/// User account commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user account that can sign in
    Create {
        /// Email address for the new account
        #[arg(short, long)]
        email: String,

        /// Read the password from the first line of stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// List user accounts
    List,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Search field argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchFieldArg {
    /// Registration number
    #[default]
    Regn,
    /// Full name with surname
    Name,
    /// Place of birth
    Pob,
    /// Gothram
    Gothram,
}

impl From<SearchFieldArg> for SearchField {
    fn from(arg: SearchFieldArg) -> Self {
        match arg {
            SearchFieldArg::Regn => Self::RegnNumber,
            SearchFieldArg::Name => Self::FullName,
            SearchFieldArg::Pob => Self::PlaceOfBirth,
            SearchFieldArg::Gothram => Self::Gothram,
        }
    }
}

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    /// Portable document format
    Pdf,
    /// Standalone HTML document
    Html,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Pdf => Self::Pdf,
            ExportFormatArg::Html => Self::Html,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

/// Parse a `KEY=VALUE` field assignment.
///
/// # Errors
///
/// Returns a message if the `=` is missing or the key is not a profile field.
pub fn parse_assignment(s: &str) -> Result<(ProfileField, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let field = key.trim().parse::<ProfileField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

/// Check that an email address has a local part and a domain.
///
/// # Errors
///
/// Returns a message if the address is malformed.
pub fn parse_email(s: &str) -> Result<String, String> {
    let email = s.trim();
    if is_valid_email(email) {
        Ok(email.to_string())
    } else {
        Err(format!("`{s}` is not an email address"))
    }
}
