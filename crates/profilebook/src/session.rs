//! User accounts, sign-in state, and the guard in front of record commands.
//!
//! [`FileSession`] keeps accounts in a JSON user list with argon2 password
//! hashes, and remembers who signed in in a separate session file. Any other
//! provider can sit behind [`IdentityProvider`].

use std::path::{Path, PathBuf};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::now_millis;

/// Shortest password accepted for a new account, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Why an account could not be created or a sign-in was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters long")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("This email is already registered")]
    EmailInUse,

    #[error("Failed to login. Please check your credentials.")]
    InvalidCredentials,
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

/// Whether `email` has a local part and a dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Check the password fields of the new-account form.
///
/// # Errors
///
/// Returns [`AuthError::WeakPassword`] for a password shorter than
/// [`MIN_PASSWORD_CHARS`], then [`AuthError::PasswordMismatch`] when the
/// confirmation differs.
pub fn validate_new_password(
    password: &str,
    confirmation: &str,
) -> std::result::Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::WeakPassword);
    }
    if password != confirmation {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(())
}

/// Accounts and sign-in state.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in identity, if any.
    async fn current_identity(&self) -> Result<Option<Identity>>;

    /// Register an account. Does not change who is signed in.
    async fn create_user(&self, email: &str, password: &str) -> Result<Identity>;

    /// Sign in with an account's email and password.
    async fn login(&self, email: &str, password: &str) -> Result<Identity>;

    /// Sign out. Signing out while signed out is not an error.
    async fn logout(&self) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    email: String,
    password_hash: String,
    #[serde(rename = "createdAt")]
    created_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserList {
    users: Vec<UserRecord>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| Error::internal(format!("password task failed: {e}")))?
    .map_err(|e| Error::internal(format!("failed to hash password: {e}")))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)?;
        Ok::<_, argon2::password_hash::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
        )
    })
    .await
    .map_err(|e| Error::internal(format!("password task failed: {e}")))?
    .map_err(|e| Error::internal(format!("stored password hash is unreadable: {e}")))
}

/// Read a JSON file, or `None` if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Accounts and sign-in state persisted as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileSession {
    session_path: PathBuf,
    users_path: PathBuf,
}

impl FileSession {
    #[must_use]
    pub fn new(session_path: impl Into<PathBuf>, users_path: impl Into<PathBuf>) -> Self {
        Self {
            session_path: session_path.into(),
            users_path: users_path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.session_path
    }

    #[must_use]
    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    async fn users(&self) -> Result<UserList> {
        Ok(read_json(&self.users_path).await?.unwrap_or_default())
    }

    /// Email addresses of every account, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the user list cannot be read.
    pub async fn list_users(&self) -> Result<Vec<String>> {
        Ok(self
            .users()
            .await?
            .users
            .into_iter()
            .map(|user| user.email)
            .collect())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FileSession {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        read_json(&self.session_path).await
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword.into());
        }

        let mut list = self.users().await?;
        if list.users.iter().any(|user| user.email == email) {
            return Err(AuthError::EmailInUse.into());
        }

        list.users.push(UserRecord {
            email: email.clone(),
            password_hash: hash_password(password.to_string()).await?,
            created_at: now_millis(),
        });
        write_json(&self.users_path, &list).await?;

        info!(email = %email, "Created user account");
        Ok(Identity { email })
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email);
        let list = self.users().await?;
        let Some(user) = list.users.into_iter().find(|user| user.email == email) else {
            warn!(email = %email, "Sign in for unknown account");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password.to_string(), user.password_hash).await? {
            warn!(email = %email, "Sign in with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let identity = Identity { email };
        write_json(&self.session_path, &identity).await?;

        info!(email = %identity.email, "Signed in");
        Ok(identity)
    }

    async fn logout(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.session_path).await {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Sign out requested with no active session");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Gate for operations that need a signed-in user.
#[derive(Clone, Copy)]
pub struct SessionGuard<'a> {
    provider: &'a dyn IdentityProvider,
}

impl std::fmt::Debug for SessionGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard").finish_non_exhaustive()
    }
}

impl<'a> SessionGuard<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn IdentityProvider) -> Self {
        Self { provider }
    }

    /// The signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] when nobody is signed in, or the
    /// provider's error if the sign-in state cannot be read.
    pub async fn require(&self) -> Result<Identity> {
        self.provider
            .current_identity()
            .await?
            .ok_or(Error::Unauthenticated)
    }
}
