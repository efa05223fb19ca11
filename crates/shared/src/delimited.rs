//! Comma-joined multi-value fields.
//!
//! The spreadsheet backend stores list-valued fields (item categories, item
//! locations) as a single cell of text joined with `", "`. Inside the
//! application those fields are lists; this module is the only place that
//! converts between the two forms. Use it as a serde `with` module:
//!
//! ```ignore
//! #[serde(rename = "category", with = "shared::delimited")]
//! pub categories: Vec<String>,
//! ```

use serde::{Deserialize, Deserializer, Serializer};

/// Separator written between values.
pub const SEPARATOR: &str = ", ";

/// Splits a stored field into its values.
///
/// Splits on `,`, trims every segment and drops empty ones.
pub fn split(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins values into the stored field form.
pub fn join<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn serialize<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&join(values))
}

/// Shapes a list-valued cell arrives in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Text(String),
    List(Vec<String>),
    Number(cell_number::Number),
}

// Sheet cells that only hold digits come back as JSON numbers.
mod cell_number {
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub enum Number {
        Int(i64),
        Float(f64),
    }

    impl std::fmt::Display for Number {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Number::Int(n) => write!(f, "{}", n),
                Number::Float(n) => write!(f, "{}", n),
            }
        }
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawField> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(RawField::Text(text)) => split(&text),
        Some(RawField::List(values)) => values
            .iter()
            .flat_map(|value| split(value))
            .collect(),
        Some(RawField::Number(n)) => vec![n.to_string()],
    })
}

/// Like the parent module, but a blank first entry survives as `""`.
///
/// For cells where the first entry carries meaning (an item's primary
/// location), a cell such as `" , 창고"` must keep saying "nothing first".
pub mod positional {
    use super::{join, RawField};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Splits a stored field, keeping a blank first entry when later
    /// entries exist.
    pub fn split(raw: &str) -> Vec<String> {
        let mut values = super::split(raw);
        let first_blank = raw
            .split(',')
            .next()
            .map_or(true, |first| first.trim().is_empty());
        if first_blank && !values.is_empty() {
            values.insert(0, String::new());
        }
        values
    }

    pub fn serialize<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&join(values))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawField> = Option::deserialize(deserializer)?;
        Ok(match raw {
            None => Vec::new(),
            Some(RawField::Text(text)) => split(&text),
            Some(RawField::List(values)) => split(&values.join(",")),
            Some(RawField::Number(n)) => vec![n.to_string()],
        })
    }
}
