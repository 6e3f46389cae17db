//! Profile form controller.
//!
//! A [`ProfileForm`] holds the editable fields of one profile, validates them
//! as a whole, and saves them through a [`ProfileStore`]: a form without an
//! identifier creates a profile, a form loaded from the store updates it.

use std::fmt;

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::profile::{InputKind, ProfileField, ProfileFields, ProfilePatch};
use crate::storage::ProfileStore;

/// Number of digits a contact number must reduce to.
pub const CONTACT_DIGITS: usize = 10;

/// What is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required field is blank.
    Required,
    /// The contact number does not reduce to exactly ten digits.
    ContactFormat,
    /// The value is not one of the field's fixed choices.
    InvalidChoice,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: ProfileField,
    pub kind: ViolationKind,
}

impl Violation {
    /// The message shown next to the field.
    #[must_use]
    pub fn message(&self) -> String {
        match (self.kind, self.field) {
            (ViolationKind::Required, ProfileField::RegnNumber) => {
                "Registration number is required".to_string()
            }
            (ViolationKind::Required, ProfileField::FullName) => {
                "Full name is required".to_string()
            }
            (ViolationKind::Required, ProfileField::ContactNo) => {
                "Contact number is required".to_string()
            }
            (ViolationKind::Required, field) => format!("{} is required", field.label()),
            (ViolationKind::ContactFormat, _) => {
                format!("Contact number must be {CONTACT_DIGITS} digits")
            }
            (ViolationKind::InvalidChoice, field) => match field.kind() {
                InputKind::Choice(choices) => {
                    format!("{} must be one of: {}", field.label(), choices.join(", "))
                }
                _ => format!("{} has an invalid value", field.label()),
            },
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.key(), self.message())
    }
}

/// Every violation found in one validation pass, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The violation recorded for `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: ProfileField) -> Option<&Violation> {
        self.violations.iter().find(|v| v.field == field)
    }

    #[must_use]
    pub fn contains(&self, field: ProfileField, kind: ViolationKind) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.kind == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    fn clear_field(&mut self, field: ProfileField) {
        self.violations.retain(|v| v.field != field);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.violations.iter().map(Violation::message).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a field set, collecting every violation rather than stopping at the first.
///
/// # Errors
///
/// Returns the full set of violations if any field is invalid.
pub fn validate_fields(fields: &ProfileFields) -> std::result::Result<(), ValidationErrors> {
    let mut violations = Vec::new();

    for field in ProfileField::ALL {
        let value = fields.get(field).trim();

        if value.is_empty() {
            if field.required() {
                violations.push(Violation {
                    field,
                    kind: ViolationKind::Required,
                });
            }
            continue;
        }

        if let InputKind::Choice(choices) = field.kind() {
            if !choices.contains(&value) {
                violations.push(Violation {
                    field,
                    kind: ViolationKind::InvalidChoice,
                });
            }
        }

        if field == ProfileField::ContactNo && !is_valid_contact(value) {
            violations.push(Violation {
                field,
                kind: ViolationKind::ContactFormat,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { violations })
    }
}

/// Whether a contact number has exactly ten digits once separators are removed.
#[must_use]
pub fn is_valid_contact(value: &str) -> bool {
    value.chars().filter(char::is_ascii_digit).count() == CONTACT_DIGITS
}

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new profile was created with this identifier.
    Created(String),
    /// The loaded profile was updated.
    Updated(String),
}

impl SubmitOutcome {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }

    /// The confirmation shown to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Created(_) => "Profile created successfully!",
            Self::Updated(_) => "Profile updated successfully!",
        }
    }
}

/// Why a submit did not save.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Validation failed; nothing was sent to the store.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// The store rejected the write. The form keeps its edits.
    #[error("Failed to save profile. Please try again.")]
    SaveFailed(#[source] Error),
}

/// Editable state for creating or editing one profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    id: Option<String>,
    fields: ProfileFields,
    errors: ValidationErrors,
}

impl ProfileForm {
    /// A blank form for a new profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with `fields`, for a new profile.
    #[must_use]
    pub fn with_fields(fields: ProfileFields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Load an existing profile for editing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no profile has this identifier, or a
    /// store error if the read fails.
    pub async fn load(store: &dyn ProfileStore, id: &str) -> Result<Self> {
        let profile = store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;

        Ok(Self {
            id: Some(profile.id),
            fields: profile.fields,
            errors: ValidationErrors::default(),
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether this form edits an existing profile.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    #[must_use]
    pub fn fields(&self) -> &ProfileFields {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        self.fields.get(field)
    }

    /// Violations from the last validation, minus fields edited since.
    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Change one field, clearing any violation shown for it.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        self.fields.set(field, value);
        self.errors.clear_field(field);
    }

    /// Apply several field changes at once.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        for (field, value) in patch.iter() {
            self.set(field, value);
        }
    }

    /// Validate every field, remembering the violations.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate(&mut self) -> std::result::Result<(), ValidationErrors> {
        let result = validate_fields(&self.fields);
        self.errors = result.clone().err().unwrap_or_default();
        result
    }

    /// Validate and save.
    ///
    /// A new profile is created; a loaded one is updated with the full field
    /// set. After a create the form is reset to blank.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] without touching the store when
    /// validation fails, or [`SubmitError::SaveFailed`] when the store write
    /// fails.
    pub async fn submit(
        &mut self,
        store: &dyn ProfileStore,
    ) -> std::result::Result<SubmitOutcome, SubmitError> {
        self.validate().map_err(SubmitError::Invalid)?;

        let outcome = match &self.id {
            Some(id) => {
                let patch = ProfilePatch::from(&self.fields);
                store.update(id, &patch).await.map_err(|e| {
                    error!(id = %id, error = %e, "Failed to update profile");
                    SubmitError::SaveFailed(e)
                })?;
                SubmitOutcome::Updated(id.clone())
            }
            None => {
                let id = store.create(&self.fields).await.map_err(|e| {
                    error!(error = %e, "Failed to create profile");
                    SubmitError::SaveFailed(e)
                })?;
                self.fields = ProfileFields::default();
                SubmitOutcome::Created(id)
            }
        };

        info!(id = %outcome.id(), "{}", outcome.message());
        Ok(outcome)
    }
}
