//! Shared identifiers, traits, and the reference-month key.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::MoniError;

/// Opaque identifier for stored entities.
///
/// Freshly created entities receive a UUID v4 string; imported data may carry
/// any string value, so the type does not enforce UUID syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exposes a stable identifier for entities stored in the data set.
pub trait Identifiable {
    fn id(&self) -> &EntityId;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// A `YYYY-MM` key selecting one calendar month.
///
/// Month membership of a transaction is a plain prefix test of its ISO date
/// string against this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey(String);

impl MonthKey {
    pub fn parse(value: &str) -> Result<Self, MoniError> {
        let trimmed = value.trim();
        let valid = trimmed.len() == 7
            && trimmed.as_bytes()[4] == b'-'
            && trimmed[..4].chars().all(|c| c.is_ascii_digit())
            && trimmed[5..].chars().all(|c| c.is_ascii_digit())
            && matches!(trimmed[5..].parse::<u32>(), Ok(1..=12));
        if !valid {
            return Err(MoniError::InvalidInput(format!(
                "`{value}` is not a YYYY-MM month"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the ISO date string falls inside this month.
    pub fn contains(&self, iso_date: &str) -> bool {
        iso_date.starts_with(&self.0)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_accepts_iso_months_only() {
        assert!(MonthKey::parse("2024-05").is_ok());
        assert!(MonthKey::parse("2024-13").is_err());
        assert!(MonthKey::parse("2024-5").is_err());
        assert!(MonthKey::parse("May 2024").is_err());
    }

    #[test]
    fn month_key_matches_by_prefix() {
        let key = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(key.as_str(), "2024-05");
        assert!(key.contains("2024-05-01"));
        assert!(!key.contains("2024-06-01"));
    }

    #[test]
    fn generated_ids_are_uuid_strings() {
        let id = EntityId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }
}
