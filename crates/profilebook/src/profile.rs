//! Core profile types for profilebook.
//!
//! This module defines the profile record, its fixed field enumeration, and the
//! partial-update payload used by the store layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed choices offered for the gender field.
pub const GENDER_CHOICES: &[&str] = &["Girl", "Boy"];

/// How a field is entered on the form boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Single-line free text.
    Text,
    /// Multi-line free text.
    MultiLine,
    /// One of a fixed list of values.
    Choice(&'static [&'static str]),
    /// A telephone number.
    Telephone,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::MultiLine => write!(f, "multi-line"),
            Self::Choice(choices) => write!(f, "choice ({})", choices.join(", ")),
            Self::Telephone => write!(f, "telephone"),
        }
    }
}

/// A field name that does not belong to the profile field enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown profile field: {0}")]
pub struct UnknownField(pub String);

/// One of the descriptive fields of a profile, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    /// Human-assigned registration number.
    RegnNumber,
    /// Gender, one of [`GENDER_CHOICES`].
    Gender,
    /// Full name including surname.
    FullName,
    /// Sect and subsect.
    SectSubsect,
    /// Clan/lineage label.
    Gothram,
    /// Date of birth, free form.
    Dob,
    /// Time of birth, free form.
    Tob,
    /// Place of birth.
    Pob,
    /// Birth star and padam.
    StarPadam,
    Height,
    Complexion,
    EducationalQualifications,
    EmploymentDetails,
    Salary,
    FatherName,
    MotherName,
    Siblings,
    /// Requirements for the spouse.
    RequirementsSpouse,
    SubsectBarNoBar,
    MaritalStatus,
    AnyOtherDetails,
    Address,
    /// Contact telephone number.
    ContactNo,
}

impl ProfileField {
    /// Every field in form order.
    pub const ALL: [Self; 23] = [
        Self::RegnNumber,
        Self::Gender,
        Self::FullName,
        Self::SectSubsect,
        Self::Gothram,
        Self::Dob,
        Self::Tob,
        Self::Pob,
        Self::StarPadam,
        Self::Height,
        Self::Complexion,
        Self::EducationalQualifications,
        Self::EmploymentDetails,
        Self::Salary,
        Self::FatherName,
        Self::MotherName,
        Self::Siblings,
        Self::RequirementsSpouse,
        Self::SubsectBarNoBar,
        Self::MaritalStatus,
        Self::AnyOtherDetails,
        Self::Address,
        Self::ContactNo,
    ];

    /// The key this field is stored under in a profile document.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::RegnNumber => "regn_number",
            Self::Gender => "gender",
            Self::FullName => "full_name_with_surname",
            Self::SectSubsect => "sect_subsect",
            Self::Gothram => "gothram",
            Self::Dob => "dob",
            Self::Tob => "tob",
            Self::Pob => "pob",
            Self::StarPadam => "star_padam",
            Self::Height => "height",
            Self::Complexion => "complexion",
            Self::EducationalQualifications => "educational_qualifications",
            Self::EmploymentDetails => "employment_details",
            Self::Salary => "salary",
            Self::FatherName => "father_name",
            Self::MotherName => "mother_name",
            Self::Siblings => "siblings",
            Self::RequirementsSpouse => "requirements_spouse",
            Self::SubsectBarNoBar => "subsect_bar_no_bar",
            Self::MaritalStatus => "marital_status",
            Self::AnyOtherDetails => "any_other_details",
            Self::Address => "address",
            Self::ContactNo => "contact_no",
        }
    }

    /// The human-facing label used on forms and printouts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RegnNumber => "Regn Number",
            Self::Gender => "Gender",
            Self::FullName => "Full Name (With surname)",
            Self::SectSubsect => "Sect /Subsect",
            Self::Gothram => "Gothram",
            Self::Dob => "DOB",
            Self::Tob => "TOB",
            Self::Pob => "POB",
            Self::StarPadam => "Star-Padam",
            Self::Height => "Height",
            Self::Complexion => "Complexion",
            Self::EducationalQualifications => "Educational Qualifications",
            Self::EmploymentDetails => "Employment Details",
            Self::Salary => "Salary",
            Self::FatherName => "Father's Name",
            Self::MotherName => "Mother's Name",
            Self::Siblings => "Siblings",
            Self::RequirementsSpouse => "Requirements Spouse",
            Self::SubsectBarNoBar => "Subsect bar/ No bar",
            Self::MaritalStatus => "Marital status",
            Self::AnyOtherDetails => "Any other details",
            Self::Address => "Address",
            Self::ContactNo => "Contact No",
        }
    }

    /// Whether the form requires a non-blank value.
    #[must_use]
    pub fn required(self) -> bool {
        matches!(
            self,
            Self::RegnNumber | Self::Gender | Self::FullName | Self::ContactNo
        )
    }

    #[must_use]
    pub fn kind(self) -> InputKind {
        match self {
            Self::Gender => InputKind::Choice(GENDER_CHOICES),
            Self::RequirementsSpouse | Self::AnyOtherDetails | Self::Address => {
                InputKind::MultiLine
            }
            Self::ContactNo => InputKind::Telephone,
            _ => InputKind::Text,
        }
    }

    /// Example input shown next to free-form fields.
    #[must_use]
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Dob => Some("e.g., 04/07/2000 or 9-May-2000"),
            Self::Tob => Some("e.g., 1.47 pm"),
            Self::Height => Some("e.g., 5.5\""),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProfileField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// The descriptive fields of a profile, without identity or timestamps.
///
/// Missing keys in a stored document decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub regn_number: String,
    pub gender: String,
    pub full_name_with_surname: String,
    pub sect_subsect: String,
    pub gothram: String,
    pub dob: String,
    pub tob: String,
    pub pob: String,
    pub star_padam: String,
    pub height: String,
    pub complexion: String,
    pub educational_qualifications: String,
    pub employment_details: String,
    pub salary: String,
    pub father_name: String,
    pub mother_name: String,
    pub siblings: String,
    pub requirements_spouse: String,
    pub subsect_bar_no_bar: String,
    pub marital_status: String,
    pub any_other_details: String,
    pub address: String,
    pub contact_no: String,
}

impl ProfileFields {
    /// Get the value of a field.
    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::RegnNumber => &self.regn_number,
            ProfileField::Gender => &self.gender,
            ProfileField::FullName => &self.full_name_with_surname,
            ProfileField::SectSubsect => &self.sect_subsect,
            ProfileField::Gothram => &self.gothram,
            ProfileField::Dob => &self.dob,
            ProfileField::Tob => &self.tob,
            ProfileField::Pob => &self.pob,
            ProfileField::StarPadam => &self.star_padam,
            ProfileField::Height => &self.height,
            ProfileField::Complexion => &self.complexion,
            ProfileField::EducationalQualifications => &self.educational_qualifications,
            ProfileField::EmploymentDetails => &self.employment_details,
            ProfileField::Salary => &self.salary,
            ProfileField::FatherName => &self.father_name,
            ProfileField::MotherName => &self.mother_name,
            ProfileField::Siblings => &self.siblings,
            ProfileField::RequirementsSpouse => &self.requirements_spouse,
            ProfileField::SubsectBarNoBar => &self.subsect_bar_no_bar,
            ProfileField::MaritalStatus => &self.marital_status,
            ProfileField::AnyOtherDetails => &self.any_other_details,
            ProfileField::Address => &self.address,
            ProfileField::ContactNo => &self.contact_no,
        }
    }

    fn get_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::RegnNumber => &mut self.regn_number,
            ProfileField::Gender => &mut self.gender,
            ProfileField::FullName => &mut self.full_name_with_surname,
            ProfileField::SectSubsect => &mut self.sect_subsect,
            ProfileField::Gothram => &mut self.gothram,
            ProfileField::Dob => &mut self.dob,
            ProfileField::Tob => &mut self.tob,
            ProfileField::Pob => &mut self.pob,
            ProfileField::StarPadam => &mut self.star_padam,
            ProfileField::Height => &mut self.height,
            ProfileField::Complexion => &mut self.complexion,
            ProfileField::EducationalQualifications => &mut self.educational_qualifications,
            ProfileField::EmploymentDetails => &mut self.employment_details,
            ProfileField::Salary => &mut self.salary,
            ProfileField::FatherName => &mut self.father_name,
            ProfileField::MotherName => &mut self.mother_name,
            ProfileField::Siblings => &mut self.siblings,
            ProfileField::RequirementsSpouse => &mut self.requirements_spouse,
            ProfileField::SubsectBarNoBar => &mut self.subsect_bar_no_bar,
            ProfileField::MaritalStatus => &mut self.marital_status,
            ProfileField::AnyOtherDetails => &mut self.any_other_details,
            ProfileField::Address => &mut self.address,
            ProfileField::ContactNo => &mut self.contact_no,
        }
    }

    /// Set the value of a field.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Merge the fields present in `patch`, leaving every other field untouched.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        for (field, value) in patch.iter() {
            self.set(field, value);
        }
    }
}

/// A partial update: only the fields it carries are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    values: BTreeMap<ProfileField, String>,
}

impl ProfilePatch {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field value, builder style.
    #[must_use]
    pub fn with(mut self, field: ProfileField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    #[must_use]
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Iterate over the carried fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (ProfileField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&ProfileFields> for ProfilePatch {
    /// A patch carrying every field, as sent when saving an edited form.
    fn from(fields: &ProfileFields) -> Self {
        let values = ProfileField::ALL
            .into_iter()
            .map(|field| (field, fields.get(field).to_string()))
            .collect();
        Self { values }
    }
}

/// Document keys that belong to a stored profile but are not fields.
const RECORD_KEYS: &[&str] = &["id", "createdAt", "updatedAt"];

impl ProfilePatch {
    /// Build a patch from a JSON object keyed by field wire keys.
    ///
    /// Record keys (`id`, `createdAt`, `updatedAt`) are skipped so that a
    /// profile's own JSON can be fed back in. `null` clears a field and
    /// numbers are taken as their text.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object, a key is not a
    /// profile field, or a value is not a string, number, or null.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut patch = Self::new();
        for (key, value) in object {
            if RECORD_KEYS.contains(&key.as_str()) {
                continue;
            }
            let field: ProfileField = key.parse()?;
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                        "{key}: expected a string, found {other}"
                    ))
                    .into())
                }
            };
            patch.set(field, value);
        }
        Ok(patch)
    }
}

/// A stored profile.
///
/// Serializes to the document shape: the field keys, the store-assigned `id`,
/// and `createdAt`/`updatedAt` in milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Identifier assigned by the store on creation.
    pub id: String,

    /// The descriptive fields.
    #[serde(flatten)]
    pub fields: ProfileFields,

    /// When the profile was created.
    #[serde(rename = "createdAt")]
    pub created_at: i64,

    /// When the profile was last written.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl Profile {
    #[must_use]
    pub fn get(&self, field: ProfileField) -> &str {
        self.fields.get(field)
    }

    #[must_use]
    pub fn regn_number(&self) -> &str {
        &self.fields.regn_number
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.fields.full_name_with_surname
    }
}
