//! In-memory location tree for one school.
//!
//! Every mutation applies immediately and then hands a copy of the rooms
//! to a [`BestEffortPersist`] in a background task. Persist failures are
//! logged and the in-memory tree is kept as is.
//!
//! Saves run one at a time. Each copy carries a generation number and a
//! copy that is no longer the newest when its turn comes is skipped, so an
//! older tree never lands after a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::location_codec::encode;
use super::persist::BestEffortPersist;
use crate::models::{LocationOption, LocationRoom, LocationShelf, LocationSlot, LocationTree};

pub struct LocationTreeStore {
    school_code: String,
    tree: LocationTree,
    persist: Arc<dyn BestEffortPersist>,
    pending: Vec<JoinHandle<()>>,
    /// Held for the duration of one save.
    save_lock: Arc<Mutex<()>>,
    /// Generation of the newest scheduled copy.
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for LocationTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationTreeStore")
            .field("school_code", &self.school_code)
            .field("tree", &self.tree)
            .field("pending", &self.pending.len())
            .finish()
    }
}

fn copy_slots(slots: &[LocationSlot]) -> Vec<LocationSlot> {
    slots
        .iter()
        .map(|slot| LocationSlot {
            id: shared::id::generate_id(),
            name: slot.name.clone(),
        })
        .collect()
}

fn copy_shelf(shelf: &LocationShelf, name: String) -> LocationShelf {
    LocationShelf {
        id: shared::id::generate_id(),
        name,
        slots: copy_slots(&shelf.slots),
    }
}

impl LocationTreeStore {
    /// Creates an empty tree for a school.
    pub fn new(school_code: impl Into<String>, persist: Arc<dyn BestEffortPersist>) -> Self {
        Self::load(school_code, Vec::new(), persist)
    }

    /// Starts from rooms already stored for the school.
    pub fn load(
        school_code: impl Into<String>,
        rooms: Vec<LocationRoom>,
        persist: Arc<dyn BestEffortPersist>,
    ) -> Self {
        Self {
            school_code: school_code.into(),
            tree: LocationTree {
                rooms,
                last_updated: Utc::now(),
            },
            persist,
            pending: Vec::new(),
            save_lock: Arc::new(Mutex::new(())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn school_code(&self) -> &str {
        &self.school_code
    }

    pub fn tree(&self) -> &LocationTree {
        &self.tree
    }

    pub fn rooms(&self) -> &[LocationRoom] {
        &self.tree.rooms
    }

    fn room_mut(&mut self, room_id: &str) -> Option<&mut LocationRoom> {
        self.tree.rooms.iter_mut().find(|r| r.id == room_id)
    }

    fn shelf_mut(&mut self, room_id: &str, shelf_id: &str) -> Option<&mut LocationShelf> {
        self.room_mut(room_id)?.shelf_mut(shelf_id)
    }

    /// Stamps the tree and schedules a background persist.
    fn commit(&mut self) {
        self.tree.last_updated = Utc::now();
        self.pending.retain(|handle| !handle.is_finished());

        let Ok(handle) = Handle::try_current() else {
            warn!(
                school_code = %self.school_code,
                "No async runtime available, location tree not persisted"
            );
            return;
        };

        let persist = Arc::clone(&self.persist);
        let save_lock = Arc::clone(&self.save_lock);
        let latest = Arc::clone(&self.generation);
        let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;
        let school_code = self.school_code.clone();
        let rooms = self.tree.rooms.clone();
        self.pending.push(handle.spawn(async move {
            let _guard = save_lock.lock().await;
            if latest.load(Ordering::SeqCst) != generation {
                debug!(
                    school_code = %school_code,
                    generation,
                    "Newer location tree queued, skipping save"
                );
                return;
            }
            match persist.persist_locations(&school_code, &rooms).await {
                Ok(()) => debug!(school_code = %school_code, rooms = rooms.len(), "Location tree persisted"),
                Err(e) => warn!(
                    school_code = %school_code,
                    error = %e,
                    "Failed to persist location tree, keeping local changes"
                ),
            }
        }));
    }

    /// Waits for background persists started so far.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Location persist task failed");
            }
        }
    }

    pub fn add_room(&mut self, name: &str) -> String {
        let id = shared::id::generate_id();
        self.tree.rooms.push(LocationRoom {
            id: id.clone(),
            name: name.trim().to_string(),
            shelves: Vec::new(),
        });
        self.commit();
        id
    }

    pub fn update_room(&mut self, room_id: &str, name: &str) -> bool {
        let Some(room) = self.room_mut(room_id) else {
            return false;
        };
        room.name = name.trim().to_string();
        self.commit();
        true
    }

    /// Removes a room with all its shelves and slots.
    pub fn delete_room(&mut self, room_id: &str) -> bool {
        let before = self.tree.rooms.len();
        self.tree.rooms.retain(|r| r.id != room_id);
        if self.tree.rooms.len() == before {
            return false;
        }
        self.commit();
        true
    }

    /// Deep-copies a room under a new name with fresh ids throughout.
    ///
    /// Returns `None` when the source room does not exist. Room names need
    /// not be unique.
    pub fn duplicate_room(&mut self, source_id: &str, new_name: &str) -> Option<String> {
        let source = self.tree.rooms.iter().find(|r| r.id == source_id)?;
        let room = LocationRoom {
            id: shared::id::generate_id(),
            name: new_name.trim().to_string(),
            shelves: source
                .shelves
                .iter()
                .map(|shelf| copy_shelf(shelf, shelf.name.clone()))
                .collect(),
        };
        let id = room.id.clone();
        self.tree.rooms.push(room);
        self.commit();
        Some(id)
    }

    pub fn add_shelf(&mut self, room_id: &str, name: &str) -> Option<String> {
        let id = shared::id::generate_id();
        self.room_mut(room_id)?.shelves.push(LocationShelf {
            id: id.clone(),
            name: name.trim().to_string(),
            slots: Vec::new(),
        });
        self.commit();
        Some(id)
    }

    pub fn update_shelf(&mut self, room_id: &str, shelf_id: &str, name: &str) -> bool {
        let Some(shelf) = self.shelf_mut(room_id, shelf_id) else {
            return false;
        };
        shelf.name = name.trim().to_string();
        self.commit();
        true
    }

    /// Removes a shelf with all its slots.
    pub fn delete_shelf(&mut self, room_id: &str, shelf_id: &str) -> bool {
        let Some(room) = self.room_mut(room_id) else {
            return false;
        };
        let before = room.shelves.len();
        room.shelves.retain(|s| s.id != shelf_id);
        if room.shelves.len() == before {
            return false;
        }
        self.commit();
        true
    }

    /// Deep-copies a shelf within its room under a new name.
    pub fn duplicate_shelf(
        &mut self,
        room_id: &str,
        shelf_id: &str,
        new_name: &str,
    ) -> Option<String> {
        let room = self.room_mut(room_id)?;
        let shelf = copy_shelf(room.shelf(shelf_id)?, new_name.trim().to_string());
        let id = shelf.id.clone();
        room.shelves.push(shelf);
        self.commit();
        Some(id)
    }

    pub fn add_slot(&mut self, room_id: &str, shelf_id: &str, name: &str) -> Option<String> {
        let id = shared::id::generate_id();
        self.shelf_mut(room_id, shelf_id)?.slots.push(LocationSlot {
            id: id.clone(),
            name: name.trim().to_string(),
        });
        self.commit();
        Some(id)
    }

    pub fn update_slot(&mut self, room_id: &str, shelf_id: &str, slot_id: &str, name: &str) -> bool {
        let Some(slot) = self
            .shelf_mut(room_id, shelf_id)
            .and_then(|shelf| shelf.slots.iter_mut().find(|s| s.id == slot_id))
        else {
            return false;
        };
        slot.name = name.trim().to_string();
        self.commit();
        true
    }

    pub fn delete_slot(&mut self, room_id: &str, shelf_id: &str, slot_id: &str) -> bool {
        let Some(shelf) = self.shelf_mut(room_id, shelf_id) else {
            return false;
        };
        let before = shelf.slots.len();
        shelf.slots.retain(|s| s.id != slot_id);
        if shelf.slots.len() == before {
            return false;
        }
        self.commit();
        true
    }

    /// Encoded location for a node path.
    ///
    /// Empty when the room is unknown; an unknown shelf or slot cuts the
    /// string at the last level that resolved.
    pub fn location_string(
        &self,
        room_id: &str,
        shelf_id: Option<&str>,
        slot_id: Option<&str>,
    ) -> String {
        let Some(room) = self.tree.rooms.iter().find(|r| r.id == room_id) else {
            return String::new();
        };
        let shelf = shelf_id.and_then(|id| room.shelf(id));
        let slot = shelf.and_then(|shelf| slot_id.and_then(|id| shelf.slot(id)));
        encode(
            &room.name,
            shelf.map(|s| s.name.as_str()),
            slot.map(|s| s.name.as_str()),
        )
    }

    /// Every selectable location, depth first.
    pub fn location_options(&self) -> Vec<LocationOption> {
        let mut options = Vec::new();
        for room in &self.tree.rooms {
            options.push(LocationOption {
                value: encode(&room.name, None, None),
                label: room.name.clone(),
                room_id: room.id.clone(),
                shelf_id: None,
                slot_id: None,
            });
            for shelf in &room.shelves {
                options.push(LocationOption {
                    value: encode(&room.name, Some(&shelf.name), None),
                    label: format!("{} > {}", room.name, shelf.name),
                    room_id: room.id.clone(),
                    shelf_id: Some(shelf.id.clone()),
                    slot_id: None,
                });
                for slot in &shelf.slots {
                    options.push(LocationOption {
                        value: encode(&room.name, Some(&shelf.name), Some(&slot.name)),
                        label: format!("{} > {} > {}", room.name, shelf.name, slot.name),
                        room_id: room.id.clone(),
                        shelf_id: Some(shelf.id.clone()),
                        slot_id: Some(slot.id.clone()),
                    });
                }
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingPersist {
        calls: Mutex<Vec<(String, Vec<LocationRoom>)>>,
        fail: bool,
        /// Saves of a tree with exactly this many rooms are delayed.
        slow_room_count: Option<usize>,
    }

    #[async_trait]
    impl BestEffortPersist for RecordingPersist {
        async fn persist_locations(
            &self,
            school_code: &str,
            rooms: &[LocationRoom],
        ) -> Result<(), GatewayError> {
            if self.slow_room_count == Some(rooms.len()) {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            self.calls
                .lock()
                .unwrap()
                .push((school_code.to_string(), rooms.to_vec()));
            if self.fail {
                Err(GatewayError::NetworkFailure("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn store_with(persist: Arc<RecordingPersist>) -> LocationTreeStore {
        LocationTreeStore::new("DG2024", persist)
    }

    fn all_ids(room: &LocationRoom) -> HashSet<String> {
        let mut ids = HashSet::new();
        ids.insert(room.id.clone());
        for shelf in &room.shelves {
            ids.insert(shelf.id.clone());
            for slot in &shelf.slots {
                ids.insert(slot.id.clone());
            }
        }
        ids
    }

    /// 전산1 > 선반A > {1칸, 2칸}, 선반B
    fn seeded(store: &mut LocationTreeStore) -> (String, String, String) {
        let room = store.add_room("전산1");
        let shelf = store.add_shelf(&room, "선반A").unwrap();
        let slot = store.add_slot(&room, &shelf, "1칸").unwrap();
        store.add_slot(&room, &shelf, "2칸").unwrap();
        store.add_shelf(&room, "선반B").unwrap();
        (room, shelf, slot)
    }

    #[tokio::test]
    async fn test_mutations_persist_in_background() {
        let persist = Arc::new(RecordingPersist::default());
        let mut store = store_with(persist.clone());
        seeded(&mut store);
        store.flush().await;

        let calls = persist.calls.lock().unwrap();
        assert!(!calls.is_empty() && calls.len() <= 5);
        let (code, rooms) = calls.last().unwrap();
        assert_eq!(code, "DG2024");
        assert_eq!(rooms[0].shelves[0].slots.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_save_never_overwrites_newer_tree() {
        let persist = Arc::new(RecordingPersist {
            slow_room_count: Some(1),
            ..Default::default()
        });
        let mut store = store_with(persist.clone());
        store.add_room("A");
        // let the one-room save start before the second edit
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.add_room("B");
        store.flush().await;

        let calls = persist.calls.lock().unwrap();
        let (_, remote) = calls.last().unwrap();
        assert_eq!(remote.len(), 2);
        assert_eq!(remote, &store.rooms().to_vec());
    }

    #[tokio::test]
    async fn test_queued_saves_keep_only_newest_copy() {
        let persist = Arc::new(RecordingPersist::default());
        let mut store = store_with(persist.clone());
        store.add_room("A");
        store.add_room("B");
        store.add_room("C");
        store.flush().await;

        let calls = persist.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 3);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_local_state() {
        let persist = Arc::new(RecordingPersist {
            fail: true,
            ..Default::default()
        });
        let mut store = store_with(persist.clone());
        let room = store.add_room("창고");
        store.flush().await;

        assert_eq!(persist.calls.lock().unwrap().len(), 1);
        assert_eq!(store.rooms().len(), 1);
        assert_eq!(store.rooms()[0].id, room);
    }

    #[test]
    fn test_mutations_without_runtime_still_apply() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let room = store.add_room("과학실");
        assert!(store.update_room(&room, "과학실2"));
        assert_eq!(store.rooms()[0].name, "과학실2");
    }

    #[tokio::test]
    async fn test_duplicate_room_is_independent() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, _, _) = seeded(&mut store);

        let copy = store.duplicate_room(&room, "X").unwrap();
        let source = store.rooms().iter().find(|r| r.id == room).unwrap().clone();
        let duplicate = store.rooms().iter().find(|r| r.id == copy).unwrap().clone();

        assert_eq!(duplicate.name, "X");
        assert_eq!(duplicate.shelves.len(), 2);
        assert_eq!(duplicate.shelves[0].slots.len(), 2);
        assert!(all_ids(&source).is_disjoint(&all_ids(&duplicate)));

        let copy_shelf = duplicate.shelves[0].id.clone();
        let copy_slot = duplicate.shelves[0].slots[0].id.clone();
        assert!(store.update_shelf(&copy, &copy_shelf, "선반Z"));
        assert!(store.update_slot(&copy, &copy_shelf, &copy_slot, "9칸"));

        let source_after = store.rooms().iter().find(|r| r.id == room).unwrap();
        assert_eq!(source_after, &source);

        let source_shelf = source.shelves[0].id.clone();
        assert!(store.update_shelf(&room, &source_shelf, "선반Y"));
        let duplicate_after = store.rooms().iter().find(|r| r.id == copy).unwrap();
        assert_eq!(duplicate_after.shelves[0].name, "선반Z");
        store.flush().await;
    }

    #[tokio::test]
    async fn test_duplicate_room_allows_same_name() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, _, _) = seeded(&mut store);
        assert!(store.duplicate_room(&room, "전산1").is_some());
        assert_eq!(store.rooms().len(), 2);
        assert_eq!(store.rooms()[1].name, "전산1");
    }

    #[tokio::test]
    async fn test_duplicate_missing_source_is_noop() {
        let persist = Arc::new(RecordingPersist::default());
        let mut store = store_with(persist.clone());
        assert_eq!(store.duplicate_room("missing", "X"), None);
        assert_eq!(store.duplicate_shelf("missing", "missing", "X"), None);
        store.flush().await;
        assert!(store.rooms().is_empty());
        assert!(persist.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_shelf_copies_slots() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, shelf, _) = seeded(&mut store);

        let copy = store.duplicate_shelf(&room, &shelf, "선반A2").unwrap();
        let room_node = &store.rooms()[0];
        assert_eq!(room_node.shelves.len(), 3);
        let source = room_node.shelf(&shelf).unwrap();
        let duplicate = room_node.shelf(&copy).unwrap();
        assert_eq!(duplicate.name, "선반A2");
        let source_slots: Vec<_> = source.slots.iter().map(|s| &s.name).collect();
        let copy_slots: Vec<_> = duplicate.slots.iter().map(|s| &s.name).collect();
        assert_eq!(source_slots, copy_slots);
        assert_ne!(source.slots[0].id, duplicate.slots[0].id);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, shelf, slot) = seeded(&mut store);

        assert!(store.delete_slot(&room, &shelf, &slot));
        assert_eq!(store.rooms()[0].shelves[0].slots.len(), 1);

        assert!(store.delete_shelf(&room, &shelf));
        assert_eq!(store.rooms()[0].shelves.len(), 1);
        assert_eq!(store.location_string(&room, Some(&shelf), None), "전산1");

        assert!(store.delete_room(&room));
        assert!(store.rooms().is_empty());
        assert!(!store.delete_room(&room));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, shelf, _) = seeded(&mut store);
        let before = store.rooms().to_vec();

        assert!(!store.update_room("nope", "x"));
        assert!(!store.update_shelf(&room, "nope", "x"));
        assert!(!store.update_slot(&room, &shelf, "nope", "x"));
        assert!(!store.delete_shelf("nope", &shelf));
        assert!(!store.delete_slot(&room, &shelf, "nope"));
        assert_eq!(store.add_shelf("nope", "x"), None);
        assert_eq!(store.add_slot(&room, "nope", "x"), None);
        assert_eq!(store.rooms(), before.as_slice());
    }

    #[tokio::test]
    async fn test_location_string_truncates_at_unknown_level() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, shelf, slot) = seeded(&mut store);

        assert_eq!(
            store.location_string(&room, Some(&shelf), Some(&slot)),
            "전산1/선반A-1칸"
        );
        assert_eq!(store.location_string(&room, Some(&shelf), None), "전산1/선반A");
        assert_eq!(store.location_string(&room, Some(&shelf), Some("nope")), "전산1/선반A");
        assert_eq!(store.location_string(&room, Some("nope"), Some(&slot)), "전산1");
        assert_eq!(store.location_string("nope", None, None), "");
    }

    #[tokio::test]
    async fn test_location_options() {
        let mut store = store_with(Arc::new(RecordingPersist::default()));
        let (room, shelf, slot) = seeded(&mut store);

        let options = store.location_options();
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "전산1",
                "전산1/선반A",
                "전산1/선반A-1칸",
                "전산1/선반A-2칸",
                "전산1/선반B"
            ]
        );
        assert_eq!(options[2].label, "전산1 > 선반A > 1칸");
        assert_eq!(options[2].room_id, room);
        assert_eq!(options[2].shelf_id.as_deref(), Some(shelf.as_str()));
        assert_eq!(options[2].slot_id.as_deref(), Some(slot.as_str()));
    }
}
