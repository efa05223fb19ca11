//! Storage location tree domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A slot (compartment) inside a shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSlot {
    pub id: String,
    pub name: String,
}

/// A shelf or cabinet inside a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationShelf {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slots: Vec<LocationSlot>,
}

/// A room (classroom, store room) holding shelves.
///
/// Node ids are opaque and independent of names; renaming a node never
/// touches location strings already stored on items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRoom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shelves: Vec<LocationShelf>,
}

impl LocationRoom {
    pub fn shelf(&self, shelf_id: &str) -> Option<&LocationShelf> {
        self.shelves.iter().find(|s| s.id == shelf_id)
    }

    pub(crate) fn shelf_mut(&mut self, shelf_id: &str) -> Option<&mut LocationShelf> {
        self.shelves.iter_mut().find(|s| s.id == shelf_id)
    }
}

impl LocationShelf {
    pub fn slot(&self, slot_id: &str) -> Option<&LocationSlot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }
}

/// One school's location tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTree {
    #[serde(default)]
    pub rooms: Vec<LocationRoom>,
    pub last_updated: DateTime<Utc>,
}

impl LocationTree {
    pub fn empty() -> Self {
        Self {
            rooms: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl Default for LocationTree {
    fn default() -> Self {
        Self::empty()
    }
}

/// A selectable location entry for item forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationOption {
    /// Encoded location token stored on items.
    pub value: String,
    /// Display label, `Room > Shelf > Slot`.
    pub label: String,
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelf_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
}
