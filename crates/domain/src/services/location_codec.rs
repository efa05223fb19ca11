//! Location token encoding and best-effort parsing.
//!
//! An item's `location` cell holds one or more tokens of the form `Room`,
//! `Room/Shelf` or `Room/Shelf-Slot`, joined with `", "`. Cells may also
//! hold free text typed by hand, so parsing has to accept anything.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Room name used for items with no usable location text.
pub const UNASSIGNED_ROOM: &str = "미지정";

lazy_static! {
    /// A shelf label, an optional `-` or whitespace separator, then the slot.
    static ref SHELF_SLOT_REGEX: Regex = Regex::new(r"^([^\s-]+)[-\s]?(.*)$").unwrap();
}

/// A location split into its three levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedLocation {
    pub room: String,
    pub shelf: Option<String>,
    pub slot: Option<String>,
}

impl ParsedLocation {
    fn room_only(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            shelf: None,
            slot: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Encodes a location token.
///
/// A slot is only written under a shelf; a slot given without one is ignored.
pub fn encode(room: &str, shelf: Option<&str>, slot: Option<&str>) -> String {
    let room = room.trim();
    match (non_empty(shelf), non_empty(slot)) {
        (Some(shelf), Some(slot)) => format!("{}/{}-{}", room, shelf, slot),
        (Some(shelf), None) => format!("{}/{}", room, shelf),
        (None, _) => room.to_string(),
    }
}

/// Parses a stored location cell into a display triple.
///
/// Only the first comma-separated token is considered, so an item listed
/// under several locations is reported under the first one. Never fails.
pub fn parse_location(raw: &str) -> ParsedLocation {
    let first = raw.trim().split(',').next().unwrap_or_default().trim();

    let segments: Vec<&str> = first
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    let Some((room, rest)) = segments.split_first() else {
        return ParsedLocation::room_only(UNASSIGNED_ROOM);
    };
    if rest.is_empty() {
        return ParsedLocation::room_only(*room);
    }

    let rest = rest.join(" ");
    match SHELF_SLOT_REGEX.captures(&rest) {
        Some(caps) => {
            let shelf = caps.get(1).map(|m| m.as_str().to_string());
            let slot = non_empty(caps.get(2).map(|m| m.as_str())).map(str::to_string);
            ParsedLocation {
                room: room.to_string(),
                shelf,
                slot,
            }
        }
        None => ParsedLocation {
            room: room.to_string(),
            shelf: non_empty(Some(&rest)).map(str::to_string),
            slot: None,
        },
    }
}

/// The locations chosen for one item, with set semantics.
///
/// Tokens keep the order they were selected in; adding a token that is
/// already present (exact string match) does nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationSelection {
    tokens: Vec<String>,
}

impl LocationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a stored `location` cell back into its tokens.
    pub fn from_field(field: &str) -> Self {
        let mut selection = Self::new();
        for token in shared::delimited::split(field) {
            selection.add(token);
        }
        selection
    }

    /// Adds a token; returns false when it was already selected or blank.
    pub fn add(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// The stored `location` cell.
    pub fn to_field(&self) -> String {
        shared::delimited::join(&self.tokens)
    }
}
