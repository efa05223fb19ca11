//! Builds the Room > Shelf > Slot report from item location strings.
//!
//! Grouping is keyed purely by the parsed names, so items entered by hand
//! and items created from the location tree are counted alike.

use std::collections::HashMap;

use shared::collation;

use super::location_codec::parse_location;
use crate::models::{InventoryItem, LocationReport, RoomSummary, ShelfSummary, SlotSummary};

/// Shelf name for items whose location names only a room.
pub const OTHER_SHELF: &str = "기타";
/// Slot name for items whose location stops at the shelf.
pub const WHOLE_SHELF_SLOT: &str = "전체";

const MAX_EXAMPLE_NAMES: usize = 3;

#[derive(Default)]
struct ShelfAcc {
    item_count: usize,
    total_quantity: u64,
    slots: HashMap<String, SlotSummary>,
}

#[derive(Default)]
struct RoomAcc {
    item_count: usize,
    total_quantity: u64,
    shelves: HashMap<String, ShelfAcc>,
}

/// Groups items by the first location listed on each.
///
/// An item carrying several comma-joined locations is counted once, under
/// its first location. Rooms, shelves and slots are ordered by name.
pub fn build_location_report(items: &[InventoryItem]) -> LocationReport {
    let mut rooms: HashMap<String, RoomAcc> = HashMap::new();
    let mut total_quantity = 0u64;

    for item in items {
        let parsed = parse_location(&item.location_field());
        let shelf_name = parsed.shelf.unwrap_or_else(|| OTHER_SHELF.to_string());
        let slot_name = parsed.slot.unwrap_or_else(|| WHOLE_SHELF_SLOT.to_string());
        let quantity = u64::from(item.quantity);
        total_quantity += quantity;

        let room = rooms.entry(parsed.room).or_default();
        room.item_count += 1;
        room.total_quantity += quantity;

        let shelf = room.shelves.entry(shelf_name).or_default();
        shelf.item_count += 1;
        shelf.total_quantity += quantity;

        let slot = shelf
            .slots
            .entry(slot_name.clone())
            .or_insert_with(|| SlotSummary {
                name: slot_name,
                ..Default::default()
            });
        slot.item_count += 1;
        slot.total_quantity += quantity;
        if slot.example_names.len() < MAX_EXAMPLE_NAMES {
            slot.example_names.push(item.name.clone());
        }
    }

    let mut rooms: Vec<RoomSummary> = rooms
        .into_iter()
        .map(|(name, room)| {
            let mut shelves: Vec<ShelfSummary> = room
                .shelves
                .into_iter()
                .map(|(name, shelf)| {
                    let mut slots: Vec<SlotSummary> = shelf.slots.into_values().collect();
                    collation::sort_by_name(&mut slots, |s| s.name.as_str());
                    ShelfSummary {
                        name,
                        item_count: shelf.item_count,
                        total_quantity: shelf.total_quantity,
                        slots,
                    }
                })
                .collect();
            collation::sort_by_name(&mut shelves, |s| s.name.as_str());
            RoomSummary {
                name,
                item_count: room.item_count,
                total_quantity: room.total_quantity,
                shelves,
            }
        })
        .collect();
    collation::sort_by_name(&mut rooms, |r| r.name.as_str());

    LocationReport {
        rooms,
        total_items: items.len(),
        total_quantity,
    }
}
