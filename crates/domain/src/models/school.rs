//! School registry records and session scope.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::lenient;
use super::location::LocationRoom;
use crate::error::GatewayError;

/// Selection key for the aggregate "all schools" scope.
pub const ALL_SCHOOLS_KEY: &str = "모두";

/// Categories every school starts with.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "마이크로보드",
    "로봇",
    "드론",
    "키트",
    "단품",
    "3D펜",
    "센서",
    "기타",
];

lazy_static! {
    static ref SCHOOL_CODE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{3,32}$").unwrap();
}

fn validate_school_code(code: &str) -> Result<(), ValidationError> {
    if SCHOOL_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("school_code");
        err.message =
            Some("School code must be 3-32 letters, digits, '-' or '_'".into());
        Err(err)
    }
}

/// Admin-owned school record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConfig {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub script_url: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub sheet_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub drive_folder_url: Option<String>,
    /// Extra categories beyond [`DEFAULT_CATEGORIES`].
    #[serde(default, deserialize_with = "lenient::json_or_encoded")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient::json_or_encoded")]
    pub locations: Vec<LocationRoom>,
}

/// Input for adding or editing a school.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSchool {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(custom(function = "validate_school_code"))]
    pub code: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_endpoint_url"))]
    pub script_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_folder_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

/// The resolved session scope handed to the core by the auth layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SchoolScope {
    Admin,
    School {
        code: String,
        name: String,
        script_url: String,
        categories: Vec<String>,
        locations: Vec<LocationRoom>,
    },
}

impl SchoolScope {
    pub fn from_config(config: SchoolConfig) -> Self {
        SchoolScope::School {
            code: config.code,
            name: config.name,
            script_url: config.script_url,
            categories: config.categories,
            locations: config.locations,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, SchoolScope::Admin)
    }

    pub fn school_name(&self) -> Option<&str> {
        match self {
            SchoolScope::Admin => None,
            SchoolScope::School { name, .. } => Some(name),
        }
    }

    pub fn school_code(&self) -> Option<&str> {
        match self {
            SchoolScope::Admin => None,
            SchoolScope::School { code, .. } => Some(code),
        }
    }

    /// Categories offered by this scope.
    pub fn categories(&self) -> Vec<String> {
        match self {
            SchoolScope::Admin => effective_categories(&[]),
            SchoolScope::School { categories, .. } => effective_categories(categories),
        }
    }
}

/// Which school's inventory is currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchoolSelection {
    All,
    School(String),
}

impl SchoolSelection {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_SCHOOLS_KEY {
            SchoolSelection::All
        } else {
            SchoolSelection::School(value.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SchoolSelection::All)
    }

    /// The value sent as `?school=` to the inventory backend.
    pub fn as_key(&self) -> &str {
        match self {
            SchoolSelection::All => ALL_SCHOOLS_KEY,
            SchoolSelection::School(name) => name,
        }
    }

    pub fn school(&self) -> Option<&str> {
        match self {
            SchoolSelection::All => None,
            SchoolSelection::School(name) => Some(name),
        }
    }
}

impl From<String> for SchoolSelection {
    fn from(value: String) -> Self {
        SchoolSelection::parse(&value)
    }
}

impl From<SchoolSelection> for String {
    fn from(value: SchoolSelection) -> Self {
        value.as_key().to_string()
    }
}

impl std::fmt::Display for SchoolSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

/// The registry's `data` field, which holds one school or a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchoolLookupResult {
    Many(Vec<SchoolConfig>),
    Single(Box<SchoolConfig>),
}

impl SchoolLookupResult {
    pub fn into_single(self) -> Result<SchoolConfig, GatewayError> {
        match self {
            SchoolLookupResult::Single(school) => Ok(*school),
            SchoolLookupResult::Many(_) => Err(GatewayError::ParseFailure(
                "expected a single school, got a list".to_string(),
            )),
        }
    }

    pub fn into_many(self) -> Result<Vec<SchoolConfig>, GatewayError> {
        match self {
            SchoolLookupResult::Many(schools) => Ok(schools),
            SchoolLookupResult::Single(_) => Err(GatewayError::ParseFailure(
                "expected a list of schools, got a single school".to_string(),
            )),
        }
    }
}

/// Default categories followed by a school's extras, without duplicates.
pub fn effective_categories(extra: &[String]) -> Vec<String> {
    let mut result: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    for category in extra {
        let category = category.trim();
        if !category.is_empty() && !result.iter().any(|c| c == category) {
            result.push(category.to_string());
        }
    }
    result
}
