use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Closed set of platform categories.
///
/// Persisted as its display string; unknown stored strings map back to
/// "unset" rather than failing a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlatformType {
    Social,
    Learning,
    Work,
    Entertainment,
    Finance,
    Payment,
    Transport,
    Shopping,
    Other,
}

impl PlatformType {
    pub const ALL: [PlatformType; 9] = [
        PlatformType::Social,
        PlatformType::Learning,
        PlatformType::Work,
        PlatformType::Entertainment,
        PlatformType::Finance,
        PlatformType::Payment,
        PlatformType::Transport,
        PlatformType::Shopping,
        PlatformType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Social => "Social",
            PlatformType::Learning => "Learning",
            PlatformType::Work => "Work",
            PlatformType::Entertainment => "Entertainment",
            PlatformType::Finance => "Finance",
            PlatformType::Payment => "Payment",
            PlatformType::Transport => "Transport",
            PlatformType::Shopping => "Shopping",
            PlatformType::Other => "Other",
        }
    }

    /// Looks up a type by its persisted display string. Unknown strings
    /// yield `None` instead of an error.
    pub fn parse(value: &str) -> Option<PlatformType> {
        let trimmed = value.trim();
        PlatformType::ALL.iter().copied().find(|t| t.as_str() == trimmed)
    }
}

/// Domain model for a platform (a named service grouping credential records)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: i32,
    pub name: String,
    pub platform_type: Option<PlatformType>,
    pub sort_index: i32,
}

/// Input model for creating a new platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlatform {
    pub name: String,
    pub platform_type: Option<PlatformType>,
}

impl NewPlatform {
    /// Validates the new platform data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "platform name".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database row for platforms
#[derive(Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::platforms)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PlatformRow {
    pub id: i32,
    pub name: String,
    pub platform_type: Option<String>,
    pub sort_index: i32,
}

/// Insertable row for platforms (id is generated by the store)
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::platforms)]
pub struct NewPlatformRow {
    pub name: String,
    pub platform_type: Option<String>,
    pub sort_index: i32,
}

// Conversion implementations
impl From<PlatformRow> for Platform {
    fn from(row: PlatformRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            platform_type: row.platform_type.as_deref().and_then(PlatformType::parse),
            sort_index: row.sort_index,
        }
    }
}

impl From<Platform> for PlatformRow {
    fn from(domain: Platform) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            platform_type: domain.platform_type.map(|t| t.as_str().to_string()),
            sort_index: domain.sort_index,
        }
    }
}

impl NewPlatform {
    /// Row inserted at the top of the list (sort_index 0)
    pub fn into_row_at_top(self) -> NewPlatformRow {
        NewPlatformRow {
            name: self.name,
            platform_type: self.platform_type.map(|t| t.as_str().to_string()),
            sort_index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_string_maps_to_unset() {
        assert_eq!(PlatformType::parse("Databases"), None);
        assert_eq!(PlatformType::parse(""), None);
    }

    #[test]
    fn type_string_mapping_round_trips() {
        for t in PlatformType::ALL {
            assert_eq!(PlatformType::parse(t.as_str()), Some(t));
        }
        // Surrounding whitespace is tolerated on the way in.
        assert_eq!(PlatformType::parse(" Payment "), Some(PlatformType::Payment));
    }

    #[test]
    fn empty_name_fails_validation() {
        let p = NewPlatform {
            name: "  ".to_string(),
            platform_type: None,
        };
        assert!(p.validate().is_err());
    }
}
