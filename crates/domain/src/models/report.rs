//! Location report produced by the aggregation view builder.

use serde::Serialize;

/// Counts at the slot level, with a few item names for preview text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub name: String,
    pub item_count: usize,
    pub total_quantity: u64,
    /// At most three names, in item order.
    pub example_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfSummary {
    pub name: String,
    pub item_count: usize,
    pub total_quantity: u64,
    pub slots: Vec<SlotSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub name: String,
    pub item_count: usize,
    pub total_quantity: u64,
    pub shelves: Vec<ShelfSummary>,
}

/// Room > Shelf > Slot tree built from item location strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub rooms: Vec<RoomSummary>,
    pub total_items: usize,
    pub total_quantity: u64,
}

impl LocationReport {
    pub fn room(&self, name: &str) -> Option<&RoomSummary> {
        self.rooms.iter().find(|r| r.name == name)
    }
}

impl RoomSummary {
    pub fn shelf(&self, name: &str) -> Option<&ShelfSummary> {
        self.shelves.iter().find(|s| s.name == name)
    }
}

impl ShelfSummary {
    pub fn slot(&self, name: &str) -> Option<&SlotSummary> {
        self.slots.iter().find(|s| s.name == name)
    }
}
