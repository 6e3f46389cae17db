//! In-memory profile search.
//!
//! Filtering runs over profiles that were already loaded from the store. It
//! never issues store calls and never reorders or mutates its input.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::profile::{Profile, ProfileField};

/// The field a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchField {
    /// Registration number.
    #[default]
    RegnNumber,
    /// Full name with surname.
    FullName,
    /// Place of birth.
    PlaceOfBirth,
    /// Gothram (clan/lineage label).
    Gothram,
}

impl SearchField {
    /// Every search field, in selector order.
    pub const ALL: [Self; 4] = [
        Self::RegnNumber,
        Self::FullName,
        Self::PlaceOfBirth,
        Self::Gothram,
    ];

    /// The profile field this selector reads.
    #[must_use]
    pub fn profile_field(self) -> ProfileField {
        match self {
            Self::RegnNumber => ProfileField::RegnNumber,
            Self::FullName => ProfileField::FullName,
            Self::PlaceOfBirth => ProfileField::Pob,
            Self::Gothram => ProfileField::Gothram,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RegnNumber => "Registration Number",
            Self::FullName => "Full Name",
            Self::PlaceOfBirth => "Place of Birth",
            Self::Gothram => "Gothram",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Select the profiles whose `field` contains `term`, ignoring case.
///
/// A blank term selects everything. Input order is preserved.
#[must_use]
pub fn filter_profiles<'a>(
    profiles: &'a [Profile],
    term: &str,
    field: SearchField,
) -> Vec<&'a Profile> {
    if term.trim().is_empty() {
        return profiles.iter().collect();
    }

    let needle = term.to_lowercase();
    let field = field.profile_field();
    profiles
        .iter()
        .filter(|profile| profile.get(field).to_lowercase().contains(&needle))
        .collect()
}

/// The result of one search over a loaded profile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<'a> {
    /// Matching profiles in list order.
    pub matches: Vec<&'a Profile>,
    /// Number of profiles searched.
    pub total: usize,
}

impl<'a> SearchOutcome<'a> {
    /// Run a search and keep the totals for display.
    #[must_use]
    pub fn run(profiles: &'a [Profile], term: &str, field: SearchField) -> Self {
        Self {
            matches: filter_profiles(profiles, term, field),
            total: profiles.len(),
        }
    }

    /// Summary line, e.g. "Showing 2 of 5 profiles".
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Showing {} of {} profiles", self.matches.len(), self.total)
    }

    /// The message to show when nothing matched, if nothing did.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.matches.is_empty() {
            None
        } else if self.total == 0 {
            Some("No profiles found. Create your first profile!")
        } else {
            Some("No profiles match your search.")
        }
    }
}

fn city_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(Hyderabad|Vijayawada|Visakhapatnam|Bangalore|Chennai|Mumbai|Delhi|Pune|Kolkata)",
        )
        .expect("city pattern is valid")
    })
}

/// Pick a known city name out of a free-text address.
///
/// Returns the first match as written in the address.
#[must_use]
pub fn extract_city(address: &str) -> Option<&str> {
    city_pattern().find(address).map(|m| m.as_str())
}
