//! What record commands tell the user.
//!
//! Each outcome is a [`Report`]: a message plus whether the command failed.
//! Delete and export failures read differently on purpose. A failed delete
//! names the operation; a failed export points at `print` as the way out.

use std::process::ExitCode;

use tracing::error;

use crate::error::Error;
use crate::profile::Profile;
use crate::render::{
    export_stem, DocumentExporter, PrintLayout, PrintOptions, EXPORT_FALLBACK_NOTICE,
};
use crate::storage::ProfileStore;

pub const NOT_FOUND_NOTICE: &str = "Profile not found";
pub const EMPTY_BOOK_NOTICE: &str = "No profiles found. Create your first profile!";
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete profile";
pub const LOAD_PROFILES_FAILED_NOTICE: &str = "Failed to load profiles. Please try again.";
pub const LOAD_PROFILE_FAILED_NOTICE: &str = "Failed to load profile. Please try again.";

/// The user-facing result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The command did what was asked.
    Done(String),
    /// Nothing was done, and that is fine.
    Notice(String),
    /// The command failed.
    Failed(String),
}

impl Report {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Done(message) | Self::Notice(message) | Self::Failed(message) => message,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.is_failure() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    /// Print the message (failures to stderr) and return the exit code.
    #[must_use]
    pub fn emit(&self) -> ExitCode {
        if self.is_failure() {
            eprintln!("{}", self.message());
        } else {
            println!("{}", self.message());
        }
        self.exit_code()
    }
}

/// Log a store or export error and report `notice` in its place.
#[must_use]
pub fn store_failure(err: &Error, notice: &str) -> Report {
    error!(error = %err, "{notice}");
    Report::Failed(notice.to_string())
}

/// How a profile is named in prompts: its full name, else its registration number.
#[must_use]
pub fn display_name(profile: &Profile) -> &str {
    if profile.full_name().trim().is_empty() {
        profile.regn_number()
    } else {
        profile.full_name()
    }
}

fn nothing_to_delete() -> Report {
    Report::Notice(format!("{NOT_FOUND_NOTICE}; nothing to delete."))
}

/// Look up the profile a delete would remove.
///
/// # Errors
///
/// Returns the report to show instead when the profile is gone or the
/// lookup fails.
pub async fn delete_target(
    store: &dyn ProfileStore,
    id: &str,
) -> std::result::Result<Profile, Report> {
    match store.get_by_id(id).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Err(nothing_to_delete()),
        Err(e) => Err(store_failure(&e, DELETE_FAILED_NOTICE)),
    }
}

/// Delete a confirmed profile, then report how many remain.
pub async fn delete_profile(store: &dyn ProfileStore, id: &str) -> Report {
    match store.delete(id).await {
        Ok(true) => {}
        Ok(false) => return nothing_to_delete(),
        Err(e) => return store_failure(&e, DELETE_FAILED_NOTICE),
    }

    match store.count().await {
        Ok(remaining) => Report::Done(format!(
            "Profile deleted.\n{remaining} profiles remaining."
        )),
        Err(e) => store_failure(&e, LOAD_PROFILES_FAILED_NOTICE),
    }
}

/// Which profiles an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget<'a> {
    /// One profile, named after its registration number.
    One(&'a str),
    /// Every profile in one document under the bulk stem.
    All { stem: &'a str },
}

/// Export profiles through `exporter`.
///
/// Any store or exporter failure reports [`EXPORT_FALLBACK_NOTICE`].
pub async fn export_profiles(
    store: &dyn ProfileStore,
    exporter: &dyn DocumentExporter,
    target: ExportTarget<'_>,
    options: &PrintOptions,
) -> Report {
    let (layout, stem) = match target {
        ExportTarget::One(id) => match store.get_by_id(id).await {
            Ok(Some(profile)) => (PrintLayout::single(&profile, options), export_stem(&profile)),
            Ok(None) => return Report::Failed(NOT_FOUND_NOTICE.to_string()),
            Err(e) => return store_failure(&e, EXPORT_FALLBACK_NOTICE),
        },
        ExportTarget::All { stem } => match store.list_all().await {
            Ok(profiles) if profiles.is_empty() => {
                return Report::Notice(EMPTY_BOOK_NOTICE.to_string())
            }
            Ok(profiles) => (PrintLayout::all(&profiles, options), stem.to_string()),
            Err(e) => return store_failure(&e, EXPORT_FALLBACK_NOTICE),
        },
    };

    match exporter.export(&layout, &stem) {
        Ok(path) => Report::Done(format!("Exported {}", path.display())),
        Err(e) => store_failure(&e, EXPORT_FALLBACK_NOTICE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::profile::{ProfileField, ProfileFields, ProfilePatch};
    use crate::render::{ExportFormat, HtmlExporter, PdfExporter};
    use crate::storage::MemoryStore;
    use std::path::Path;
    use tempfile::TempDir;

    /// A store whose every call fails.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl ProfileStore for BrokenStore {
        async fn create(&self, _fields: &ProfileFields) -> Result<String> {
            Err(Error::store_write("create", "backend unavailable"))
        }
        async fn list_all(&self) -> Result<Vec<Profile>> {
            Err(Error::store_read("list_all", "backend unavailable"))
        }
        async fn get_by_id(&self, _id: &str) -> Result<Option<Profile>> {
            Err(Error::store_read("get_by_id", "backend unavailable"))
        }
        async fn update(&self, _id: &str, _patch: &ProfilePatch) -> Result<()> {
            Err(Error::store_write("update", "backend unavailable"))
        }
        async fn delete(&self, _id: &str) -> Result<bool> {
            Err(Error::store_write("delete", "backend unavailable"))
        }
        async fn count(&self) -> Result<usize> {
            Err(Error::store_read("count", "backend unavailable"))
        }
    }

    /// An exporter that cannot render anything.
    struct FailingExporter;

    impl DocumentExporter for FailingExporter {
        fn format(&self) -> ExportFormat {
            ExportFormat::Pdf
        }
        fn output_dir(&self) -> &Path {
            Path::new("unused")
        }
        fn render(&self, _layout: &PrintLayout) -> Result<Vec<u8>> {
            Err(Error::export("pdf document", "renderer crashed"))
        }
    }

    fn fields(regn: &str, name: &str) -> ProfileFields {
        let mut fields = ProfileFields::default();
        fields.set(ProfileField::RegnNumber, regn);
        fields.set(ProfileField::FullName, name);
        fields
    }

    #[test]
    fn test_report_exit_status() {
        assert!(!Report::Done("ok".to_string()).is_failure());
        assert!(!Report::Notice("meh".to_string()).is_failure());
        let failed = Report::Failed("no".to_string());
        assert!(failed.is_failure());
        assert_eq!(failed.message(), "no");
    }

    #[tokio::test]
    async fn test_display_name_falls_back_to_regn() {
        let store = MemoryStore::new();
        let named = store.create(&fields("R1", "Jane Doe")).await.unwrap();
        let unnamed = store.create(&fields("R2", " ")).await.unwrap();

        let named = store.get_by_id(&named).await.unwrap().unwrap();
        let unnamed = store.get_by_id(&unnamed).await.unwrap().unwrap();
        assert_eq!(display_name(&named), "Jane Doe");
        assert_eq!(display_name(&unnamed), "R2");
    }

    #[tokio::test]
    async fn test_failed_delete_names_the_operation() {
        let report = delete_profile(&BrokenStore, "abc").await;
        assert_eq!(report, Report::Failed(DELETE_FAILED_NOTICE.to_string()));
        assert!(report.is_failure());

        let report = delete_target(&BrokenStore, "abc").await.unwrap_err();
        assert_eq!(report, Report::Failed(DELETE_FAILED_NOTICE.to_string()));
    }

    #[tokio::test]
    async fn test_delete_missing_is_a_notice() {
        let store = MemoryStore::new();
        let report = delete_target(&store, "gone").await.unwrap_err();
        assert!(matches!(report, Report::Notice(_)));
        assert!(!delete_profile(&store, "gone").await.is_failure());
    }

    #[tokio::test]
    async fn test_delete_reports_remaining() {
        let store = MemoryStore::new();
        let id = store.create(&fields("R1", "Jane")).await.unwrap();
        store.create(&fields("R2", "John")).await.unwrap();

        assert_eq!(delete_target(&store, &id).await.unwrap().id, id);
        let report = delete_profile(&store, &id).await;
        assert_eq!(
            report,
            Report::Done("Profile deleted.\n1 profiles remaining.".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_export_points_at_print() {
        let store = MemoryStore::new();
        let id = store.create(&fields("R1", "Jane")).await.unwrap();
        let options = PrintOptions::default();

        let report =
            export_profiles(&store, &FailingExporter, ExportTarget::One(&id), &options).await;
        assert_eq!(report, Report::Failed(EXPORT_FALLBACK_NOTICE.to_string()));

        let dir = TempDir::new().unwrap();
        let exporter = HtmlExporter::new(dir.path());
        let report = export_profiles(
            &BrokenStore,
            &exporter,
            ExportTarget::All {
                stem: "all-profiles",
            },
            &options,
        )
        .await;
        assert_eq!(report, Report::Failed(EXPORT_FALLBACK_NOTICE.to_string()));
        assert!(report.is_failure());
    }

    #[tokio::test]
    async fn test_export_missing_and_empty() {
        let store = MemoryStore::new();
        let options = PrintOptions::default();

        let report =
            export_profiles(&store, &FailingExporter, ExportTarget::One("gone"), &options).await;
        assert_eq!(report, Report::Failed(NOT_FOUND_NOTICE.to_string()));

        let report = export_profiles(
            &store,
            &FailingExporter,
            ExportTarget::All {
                stem: "all-profiles",
            },
            &options,
        )
        .await;
        assert_eq!(report, Report::Notice(EMPTY_BOOK_NOTICE.to_string()));
    }

    #[tokio::test]
    async fn test_export_one_and_all_as_pdf() {
        let store = MemoryStore::new();
        let id = store.create(&fields("REG001", "Jane")).await.unwrap();
        store.create(&fields("", "John")).await.unwrap();
        let dir = TempDir::new().unwrap();
        let exporter = PdfExporter::new(dir.path());
        let options = PrintOptions::default();

        let report = export_profiles(&store, &exporter, ExportTarget::One(&id), &options).await;
        assert!(!report.is_failure());
        assert!(dir.path().join("REG001.pdf").exists());

        let report = export_profiles(
            &store,
            &exporter,
            ExportTarget::All {
                stem: "all-profiles",
            },
            &options,
        )
        .await;
        assert!(report.message().ends_with("all-profiles.pdf"));
    }
}
