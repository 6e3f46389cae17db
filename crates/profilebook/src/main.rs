//! `profbook` - CLI for profilebook
//!
//! This binary provides the command-line interface for creating, searching,
//! editing, deleting, printing, and exporting profiles.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use profilebook::cli::output::{format_fields, format_list, format_profile};
use profilebook::cli::report::{
    self, delete_profile, delete_target, display_name, export_profiles, ExportTarget, Report,
    EMPTY_BOOK_NOTICE, LOAD_PROFILES_FAILED_NOTICE, LOAD_PROFILE_FAILED_NOTICE, NOT_FOUND_NOTICE,
};
use profilebook::cli::{
    Cli, Command, ConfigCommand, CreateCommand, DeleteCommand, EditCommand, ExportCommand,
    FieldInput, ListCommand, LoginCommand, PrintCommand, UserCommand, ViewCommand,
};
use profilebook::render::{render_text, ExportFormat, PrintLayout};
use profilebook::session::validate_new_password;
use profilebook::{
    init_logging, Config, Error, FileSession, IdentityProvider, ProfileForm, ProfilePatch,
    ProfileStore, SearchOutcome, SessionGuard, SqliteStore, SubmitError,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let session = FileSession::new(config.session_path(), config.users_path());

    // The first account can be created before anyone can sign in.
    let first_account = matches!(cli.command, Command::User(UserCommand::Create { .. }))
        && session.list_users().await?.is_empty();

    if cli.command.requires_session() && !first_account {
        match SessionGuard::new(&session).require().await {
            Ok(identity) => debug!(email = %identity.email, "Session active"),
            Err(e) if e.is_unauthenticated() => {
                eprintln!("Not signed in. Run `profbook login --email <EMAIL>` first.");
                if session.list_users().await?.is_empty() {
                    eprintln!("No accounts exist yet. Run `profbook user create --email <EMAIL>`.");
                }
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e).context("failed to read session"),
        }
    }

    match cli.command {
        Command::Fields => {
            print!("{}", format_fields());
            Ok(ExitCode::SUCCESS)
        }
        Command::Status(cmd) => handle_status(&config, &session, cmd.json).await,
        Command::Login(cmd) => handle_login(&session, &cmd).await,
        Command::User(cmd) => handle_user(&session, cmd).await,
        Command::Logout => {
            session.logout().await?;
            println!("Signed out.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            match session.current_identity().await? {
                Some(identity) => println!("{}", identity.email),
                None => println!("Not signed in."),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(cmd) => handle_config(&config, cli.config, cmd),
        Command::List(cmd) => handle_list(&open_store(&config)?, &cmd).await,
        Command::View(cmd) => handle_view(&open_store(&config)?, &cmd).await,
        Command::Create(cmd) => handle_create(&open_store(&config)?, &cmd).await,
        Command::Edit(cmd) => handle_edit(&open_store(&config)?, &cmd).await,
        Command::Delete(cmd) => handle_delete(&open_store(&config)?, &cmd).await,
        Command::Print(cmd) => handle_print(&open_store(&config)?, &config, &cmd).await,
        Command::Export(cmd) => handle_export(&open_store(&config)?, &config, cmd).await,
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path)
        .with_context(|| format!("failed to open profile store at {}", path.display()))
}

/// Log a store failure and show the user a generic notice.
fn store_failure(err: &Error, notice: &str) -> ExitCode {
    report::store_failure(err, notice).emit()
}

/// Read a password from the first line of stdin, or prompt for it.
async fn read_password(from_stdin: bool, prompt: &'static str) -> anyhow::Result<String> {
    if from_stdin {
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let password = tokio::task::spawn_blocking(move || {
        dialoguer::Password::new().with_prompt(prompt).interact()
    })
    .await??;
    Ok(password)
}

fn auth_failure(err: Error) -> anyhow::Result<ExitCode> {
    match err {
        Error::Auth(auth) => {
            eprintln!("{auth}");
            Ok(ExitCode::FAILURE)
        }
        other => Err(other.into()),
    }
}

async fn handle_login(session: &FileSession, cmd: &LoginCommand) -> anyhow::Result<ExitCode> {
    let password = read_password(cmd.password_stdin, "Password").await?;
    match session.login(&cmd.email, &password).await {
        Ok(identity) => {
            println!("Signed in as {}", identity.email);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => auth_failure(e),
    }
}

async fn handle_user(session: &FileSession, cmd: UserCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        UserCommand::Create {
            email,
            password_stdin,
        } => {
            let password = read_password(password_stdin, "Password").await?;
            let confirmation = if password_stdin {
                password.clone()
            } else {
                read_password(false, "Confirm password").await?
            };
            if let Err(e) = validate_new_password(&password, &confirmation) {
                eprintln!("{e}");
                return Ok(ExitCode::FAILURE);
            }

            match session.create_user(&email, &password).await {
                Ok(identity) => {
                    println!("User account created successfully for {}", identity.email);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => auth_failure(e),
            }
        }
        UserCommand::List => {
            for email in session.list_users().await? {
                println!("{email}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn handle_list(store: &dyn ProfileStore, cmd: &ListCommand) -> anyhow::Result<ExitCode> {
    let profiles = match store.list_all().await {
        Ok(profiles) => profiles,
        Err(e) => return Ok(store_failure(&e, LOAD_PROFILES_FAILED_NOTICE)),
    };

    let term = cmd.search.as_deref().unwrap_or_default();
    let outcome = SearchOutcome::run(&profiles, term, cmd.field.into());
    print!("{}", format_list(&outcome, cmd.format)?);
    Ok(ExitCode::SUCCESS)
}

async fn handle_view(store: &dyn ProfileStore, cmd: &ViewCommand) -> anyhow::Result<ExitCode> {
    let profile = match store.get_by_id(&cmd.id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            eprintln!("{NOT_FOUND_NOTICE}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Ok(store_failure(&e, LOAD_PROFILE_FAILED_NOTICE)),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print!("{}", format_profile(&profile));
    }
    Ok(ExitCode::SUCCESS)
}

/// Collect field values from `--from` and `--set`, with `--set` taking precedence.
async fn read_input(input: &FieldInput) -> anyhow::Result<ProfilePatch> {
    let mut patch = match &input.from {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            ProfilePatch::from_json(&json)
                .with_context(|| format!("failed to read profile fields from {}", path.display()))?
        }
        None => ProfilePatch::new(),
    };

    for (field, value) in input.assignment_patch().iter() {
        patch.set(field, value);
    }
    Ok(patch)
}

async fn submit_form(store: &dyn ProfileStore, form: &mut ProfileForm) -> ExitCode {
    match form.submit(store).await {
        Ok(outcome) => {
            println!("{} ({})", outcome.message(), outcome.id());
            ExitCode::SUCCESS
        }
        Err(SubmitError::Invalid(errors)) => {
            eprintln!("Profile not saved:");
            for violation in errors.violations() {
                eprintln!("  {:<24} {}", violation.field.key(), violation.message());
            }
            ExitCode::FAILURE
        }
        Err(e @ SubmitError::SaveFailed(_)) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn handle_create(store: &dyn ProfileStore, cmd: &CreateCommand) -> anyhow::Result<ExitCode> {
    let patch = read_input(&cmd.input).await?;

    let mut form = ProfileForm::new();
    form.apply(&patch);
    Ok(submit_form(store, &mut form).await)
}

async fn handle_edit(store: &dyn ProfileStore, cmd: &EditCommand) -> anyhow::Result<ExitCode> {
    if cmd.input.is_empty() {
        eprintln!("Nothing to change. Use --set KEY=VALUE or --from FILE.");
        return Ok(ExitCode::FAILURE);
    }
    let patch = read_input(&cmd.input).await?;

    let mut form = match ProfileForm::load(store, &cmd.id).await {
        Ok(form) => form,
        Err(e) if e.is_not_found() => {
            eprintln!("{NOT_FOUND_NOTICE}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Ok(store_failure(&e, LOAD_PROFILE_FAILED_NOTICE)),
    };

    form.apply(&patch);
    Ok(submit_form(store, &mut form).await)
}

async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{prompt} [y/N] ").as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn handle_delete(store: &dyn ProfileStore, cmd: &DeleteCommand) -> anyhow::Result<ExitCode> {
    let profile = match delete_target(store, &cmd.id).await {
        Ok(profile) => profile,
        Err(report) => return Ok(report.emit()),
    };

    let prompt = format!("Are you sure you want to delete {}?", display_name(&profile));
    if !cmd.yes && !confirm(&prompt).await? {
        return Ok(Report::Notice("Cancelled.".to_string()).emit());
    }

    Ok(delete_profile(store, &cmd.id).await.emit())
}

async fn handle_print(
    store: &dyn ProfileStore,
    config: &Config,
    cmd: &PrintCommand,
) -> anyhow::Result<ExitCode> {
    let layout = if let Some(id) = &cmd.id {
        match store.get_by_id(id).await {
            Ok(Some(profile)) => PrintLayout::single(&profile, &config.print),
            Ok(None) => {
                eprintln!("{NOT_FOUND_NOTICE}");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Ok(store_failure(&e, LOAD_PROFILE_FAILED_NOTICE)),
        }
    } else {
        match store.list_all().await {
            Ok(profiles) if profiles.is_empty() => {
                println!("{EMPTY_BOOK_NOTICE}");
                return Ok(ExitCode::SUCCESS);
            }
            Ok(profiles) => PrintLayout::all(&profiles, &config.print),
            Err(e) => return Ok(store_failure(&e, LOAD_PROFILES_FAILED_NOTICE)),
        }
    };

    print!("{}", render_text(&layout));
    Ok(ExitCode::SUCCESS)
}

async fn handle_export(
    store: &dyn ProfileStore,
    config: &Config,
    cmd: ExportCommand,
) -> anyhow::Result<ExitCode> {
    let format = cmd.format.map_or(config.export.format, ExportFormat::from);
    let exporter = format.exporter(cmd.out.unwrap_or_else(|| config.export_dir()));

    let target = match &cmd.id {
        Some(id) => ExportTarget::One(id),
        None => ExportTarget::All {
            stem: &config.export.bulk_file_stem,
        },
    };

    Ok(export_profiles(store, exporter.as_ref(), target, &config.print)
        .await
        .emit())
}

async fn handle_status(
    config: &Config,
    session: &FileSession,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let identity = session.current_identity().await?;
    let database_path = config.database_path();
    let count = match SqliteStore::open_existing(&database_path) {
        Ok(Some(store)) => store.count().await.ok(),
        Ok(None) => Some(0),
        Err(e) => {
            debug!(error = %e, "Profile store unavailable");
            None
        }
    };

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "profiles": count,
            "signed_in": identity.as_ref().map(|i| i.email.as_str()),
            "session_path": config.session_path(),
            "export_dir": config.export_dir(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("profbook status");
        println!("---------------");
        println!("Database:      {}", config.database_path().display());
        match count {
            Some(count) => println!("Profiles:      {count}"),
            None => println!("Profiles:      unavailable"),
        }
        match &identity {
            Some(identity) => println!("Signed in as:  {}", identity.email),
            None => println!("Signed in as:  nobody"),
        }
        println!(
            "Exports:       {} ({})",
            config.export_dir().display(),
            config.export.format
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(
    config: &Config,
    config_path: Option<PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Session]");
                println!("  Session path:       {}", config.session_path().display());
                println!("  Users path:         {}", config.users_path().display());
                println!();
                println!("[Print]");
                println!("  Header title:       {}", config.print.header_title);
                println!("  Empty placeholder:  {}", config.print.empty_placeholder);
                println!();
                println!("[Export]");
                println!("  Output directory:   {}", config.export_dir().display());
                println!("  Bulk file stem:     {}", config.export.bulk_file_stem);
                println!("  Format:             {}", config.export.format);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
