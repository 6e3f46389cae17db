//! `profilebook` - Record management for matrimonial profiles
//!
//! This library provides the profile model, a document-style profile store,
//! in-memory search, a validating form controller, and print/export rendering
//! used by the `profbook` binary.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod profile;
pub mod render;
pub mod search;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{ProfileForm, SubmitError, SubmitOutcome, ValidationErrors};
pub use logging::init_logging;
pub use profile::{Profile, ProfileField, ProfileFields, ProfilePatch};
pub use search::{filter_profiles, SearchField, SearchOutcome};
pub use session::{AuthError, FileSession, Identity, IdentityProvider, SessionGuard};
pub use storage::{MemoryStore, ProfileStore, SqliteStore};
