use std::collections::HashSet;
use std::fmt;

use super::data::{Item, ItemId, ProfileId};
use super::gallery::GalleryRegistry;
use super::profiles::{ProfileError, ProfileRegistry};
use super::store::StoreError;

/// Where a single item currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Waiting in the gallery, not assigned to anyone.
    Unsorted,
    /// Owned by the profile with this id.
    InProfile(ProfileId),
}

/// Drag lifecycle events fed to the engine by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementEvent {
    /// The user picked up an item.
    DragStart(ItemId),
    /// The user released an item, possibly over a profile card.
    DragEnd {
        item: ItemId,
        target: Option<ProfileId>,
    },
    /// The drag was aborted without a drop.
    DragCancel,
}

/// A completed move of one item into a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub item: ItemId,
    pub to: ProfileId,
}

/// The full placement state: every known item is either unsorted in the
/// gallery or held by exactly one profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub gallery: GalleryRegistry,
    pub profiles: ProfileRegistry,
}

impl Snapshot {
    /// Starting state for a fresh installation.
    pub fn seeded() -> Self {
        Snapshot {
            gallery: GalleryRegistry::default(),
            profiles: ProfileRegistry::seeded(),
        }
    }

    /// Find where an item currently lives. The gallery is checked first,
    /// then the profiles.
    pub fn locate(&self, item: &ItemId) -> Option<Placement> {
        if self.gallery.contains(item) {
            return Some(Placement::Unsorted);
        }
        self.profiles
            .find_item(item)
            .cloned()
            .map(Placement::InProfile)
    }

    /// Whether any item exists anywhere, unsorted or already profiled.
    pub fn has_items(&self) -> bool {
        !self.gallery.is_empty() || self.profiles.item_count() > 0
    }

    /// Every item id appears at most once across the whole snapshot.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        for item in self.gallery.items() {
            if !seen.insert(&item.id) {
                return false;
            }
        }
        for (_, profile) in self.profiles.iter() {
            for item in &profile.items {
                if !seen.insert(&item.id) {
                    return false;
                }
            }
        }
        true
    }

    /// Move an item into the target profile. Returns `None` and leaves the
    /// snapshot untouched when the target does not exist, the item is
    /// unknown, or the item is already in the target.
    fn transfer(&mut self, item: &ItemId, target: &ProfileId) -> Option<Transfer> {
        let Snapshot { gallery, profiles } = self;

        // Validate the target before touching the source, so a bad drop
        // can never strand the item between containers.
        if !profiles.contains(target) {
            return None;
        }

        let moved = match gallery.remove(item) {
            Some(found) => found,
            None => {
                let source = profiles.find_item(item)?.clone();
                if source == *target {
                    // Dropping onto the profile that already holds the
                    // item changes nothing.
                    return None;
                }
                profiles.take_item(&source, item)?
            }
        };

        let appended = profiles.append_item(target, moved);
        debug_assert!(appended.is_ok(), "target existence checked above");
        debug_assert!(self.is_consistent());

        Some(Transfer {
            item: item.clone(),
            to: target.clone(),
        })
    }
}

/// Persistence backend for placement snapshots.
pub trait Repository {
    /// Load the stored snapshot, or a sensible default when nothing has
    /// been stored yet.
    fn load(&mut self) -> Snapshot;

    /// Persist the complete snapshot.
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// The stateful core of the dashboard. All mutations flow through engine
/// methods, which keep the snapshot consistent, write it through the
/// repository, and notify registered listeners.
pub struct PlacementEngine {
    snapshot: Snapshot,
    /// Id of the item currently being dragged, if any.
    dragging: Option<ItemId>,
    repository: Box<dyn Repository>,
    listeners: Vec<Box<dyn FnMut(&Snapshot)>>,
}

impl PlacementEngine {
    /// Build an engine around a repository, loading whatever snapshot it
    /// currently holds.
    pub fn with_repository(mut repository: Box<dyn Repository>) -> Self {
        let snapshot = repository.load();
        PlacementEngine {
            snapshot,
            dragging: None,
            repository,
            listeners: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The item currently being dragged, if a drag is in progress.
    pub fn dragging(&self) -> Option<&ItemId> {
        self.dragging.as_ref()
    }

    /// Register a listener invoked after every committed change.
    pub fn on_change(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Feed a drag event through the engine. Returns the transfer when the
    /// event completed a move; every invalid or targetless drop is a no-op.
    pub fn apply(&mut self, event: PlacementEvent) -> Option<Transfer> {
        match event {
            PlacementEvent::DragStart(item) => {
                if self.snapshot.locate(&item).is_some() {
                    self.dragging = Some(item);
                }
                None
            }
            PlacementEvent::DragEnd { item, target } => {
                self.dragging = None;
                let target = target?;
                let transfer = self.snapshot.transfer(&item, &target)?;
                self.commit();
                Some(transfer)
            }
            PlacementEvent::DragCancel => {
                self.dragging = None;
                None
            }
        }
    }

    /// Add freshly imported items to the gallery. Ids already present
    /// anywhere in the snapshot are skipped. Returns how many were added.
    pub fn add_items(&mut self, items: Vec<Item>) -> usize {
        let fresh: Vec<Item> = items
            .into_iter()
            .filter(|item| self.snapshot.locate(&item.id).is_none())
            .collect();

        let added = self.snapshot.gallery.add(fresh);
        if added > 0 {
            self.commit();
        }
        added
    }

    /// Create an empty profile and return its id.
    pub fn create_profile(&mut self) -> ProfileId {
        let id = self.snapshot.profiles.create();
        self.commit();
        id
    }

    /// Rename an existing profile.
    pub fn rename_profile(&mut self, id: &ProfileId, name: &str) -> Result<(), ProfileError> {
        self.snapshot.profiles.rename(id, name)?;
        self.commit();
        Ok(())
    }

    /// Delete a profile, returning its items to the end of the gallery.
    /// Returns the deleted profile's name.
    pub fn delete_profile(&mut self, id: &ProfileId) -> Result<String, ProfileError> {
        let removed = self.snapshot.profiles.delete(id)?;
        self.snapshot.gallery.add(removed.items);
        debug_assert!(self.snapshot.is_consistent());
        self.commit();
        Ok(removed.name)
    }

    /// Write the snapshot through the repository and tell the listeners.
    /// Persistence failures are logged and swallowed; the in-memory state
    /// stays authoritative for the rest of the session.
    fn commit(&mut self) {
        if let Err(error) = self.repository.save(&self.snapshot) {
            eprintln!("⚠️  Failed to persist state: {}", error);
        }
        for listener in &mut self.listeners {
            listener(&self.snapshot);
        }
    }
}

// Implement Debug by hand since the repository and listeners are opaque
impl fmt::Debug for PlacementEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacementEngine")
            .field("snapshot", &self.snapshot)
            .field("dragging", &self.dragging)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::state::store::MemoryRepository;

    fn item(id: &str) -> Item {
        Item::new(ItemId(id.into()), format!("/tmp/{id}.jpg"))
    }

    fn aluno() -> ProfileId {
        ProfileId("aluno-1".into())
    }

    /// Engine over an in-memory store, preloaded with three unsorted items
    /// and the seeded default profile.
    fn seeded_engine() -> PlacementEngine {
        let repository = MemoryRepository::new(Snapshot::seeded());
        let mut engine = PlacementEngine::with_repository(Box::new(repository));
        engine.add_items(vec![item("a"), item("b"), item("c")]);
        engine
    }

    /// Repository that records every snapshot handed to `save`.
    struct RecordingRepository {
        initial: Snapshot,
        saved: Rc<RefCell<Vec<Snapshot>>>,
    }

    impl Repository for RecordingRepository {
        fn load(&mut self) -> Snapshot {
            self.initial.clone()
        }

        fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
            self.saved.borrow_mut().push(snapshot.clone());
            Ok(())
        }
    }

    #[test]
    fn test_transfer_moves_gallery_item_into_profile() {
        let mut engine = seeded_engine();

        engine.apply(PlacementEvent::DragStart(ItemId("a".into())));
        let transfer = engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });

        assert_eq!(
            transfer,
            Some(Transfer {
                item: ItemId("a".into()),
                to: aluno(),
            })
        );
        assert_eq!(engine.snapshot().gallery.len(), 2);
        assert_eq!(
            engine.snapshot().locate(&ItemId("a".into())),
            Some(Placement::InProfile(aluno()))
        );
        assert!(engine.snapshot().is_consistent());
        assert_eq!(engine.dragging(), None);
    }

    #[test]
    fn test_items_move_between_profiles() {
        let mut engine = seeded_engine();
        let second = engine.create_profile();

        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });
        let transfer = engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(second.clone()),
        });

        assert_eq!(transfer.map(|t| t.to), Some(second.clone()));
        assert_eq!(
            engine.snapshot().locate(&ItemId("a".into())),
            Some(Placement::InProfile(second))
        );
        assert!(engine.snapshot().is_consistent());
    }

    #[test]
    fn test_drop_on_own_profile_changes_nothing() {
        let mut engine = seeded_engine();
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });

        let before = engine.snapshot().clone();
        let transfer = engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });

        assert_eq!(transfer, None);
        assert_eq!(engine.snapshot(), &before);
    }

    #[test]
    fn test_invalid_drops_leave_everything_in_place() {
        let mut engine = seeded_engine();
        let before = engine.snapshot().clone();

        // Released outside any profile card.
        assert_eq!(
            engine.apply(PlacementEvent::DragEnd {
                item: ItemId("a".into()),
                target: None,
            }),
            None
        );
        // Target profile does not exist.
        assert_eq!(
            engine.apply(PlacementEvent::DragEnd {
                item: ItemId("a".into()),
                target: Some(ProfileId("ghost".into())),
            }),
            None
        );
        // Item id is unknown.
        assert_eq!(
            engine.apply(PlacementEvent::DragEnd {
                item: ItemId("ghost".into()),
                target: Some(aluno()),
            }),
            None
        );

        assert_eq!(engine.snapshot(), &before);
        assert!(engine.snapshot().is_consistent());
    }

    #[test]
    fn test_drag_lifecycle_tracks_current_item() {
        let mut engine = seeded_engine();

        engine.apply(PlacementEvent::DragStart(ItemId("b".into())));
        assert_eq!(engine.dragging(), Some(&ItemId("b".into())));

        engine.apply(PlacementEvent::DragCancel);
        assert_eq!(engine.dragging(), None);

        // Unknown items never become the dragged item.
        engine.apply(PlacementEvent::DragStart(ItemId("ghost".into())));
        assert_eq!(engine.dragging(), None);
    }

    #[test]
    fn test_delete_profile_returns_items_to_gallery_end() {
        let mut engine = seeded_engine();
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });

        let name = engine.delete_profile(&aluno()).unwrap();

        assert_eq!(name, "João Pedro");
        let ids: Vec<&str> = engine
            .snapshot()
            .gallery
            .items()
            .iter()
            .map(|i| i.id.0.as_str())
            .collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert!(engine.snapshot().profiles.is_empty());
        assert!(engine.snapshot().is_consistent());
    }

    #[test]
    fn test_add_items_skips_ids_already_owned() {
        let mut engine = seeded_engine();
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });

        // "a" is held by a profile, "b" is still unsorted, "d" is new.
        let added = engine.add_items(vec![item("a"), item("b"), item("d")]);

        assert_eq!(added, 1);
        assert_eq!(engine.snapshot().gallery.len(), 3);
        assert!(engine.snapshot().is_consistent());
    }

    #[test]
    fn test_has_items_counts_profiled_items_too() {
        let mut snapshot = Snapshot::seeded();
        assert!(!snapshot.has_items());

        snapshot.profiles.append_item(&aluno(), item("a")).unwrap();
        assert!(snapshot.has_items());
    }

    #[test]
    fn test_every_change_is_written_through() {
        let saved = Rc::new(RefCell::new(Vec::new()));
        let mut engine = PlacementEngine::with_repository(Box::new(RecordingRepository {
            initial: Snapshot::seeded(),
            saved: Rc::clone(&saved),
        }));

        engine.add_items(vec![item("a")]);
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });

        let saved = saved.borrow();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.last(), Some(engine.snapshot()));
    }

    #[test]
    fn test_no_op_events_do_not_persist_or_notify() {
        let saved = Rc::new(RefCell::new(Vec::new()));
        let mut engine = PlacementEngine::with_repository(Box::new(RecordingRepository {
            initial: Snapshot::seeded(),
            saved: Rc::clone(&saved),
        }));
        let notified = Rc::new(Cell::new(0));
        let observer = Rc::clone(&notified);
        engine.on_change(move |_| observer.set(observer.get() + 1));

        engine.apply(PlacementEvent::DragStart(ItemId("ghost".into())));
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("ghost".into()),
            target: Some(aluno()),
        });
        engine.apply(PlacementEvent::DragCancel);
        engine.add_items(Vec::new());

        assert_eq!(saved.borrow().len(), 0);
        assert_eq!(notified.get(), 0);
    }

    #[test]
    fn test_listeners_observe_every_change() {
        let mut engine = seeded_engine();
        let notified = Rc::new(Cell::new(0));
        let observer = Rc::clone(&notified);
        engine.on_change(move |snapshot| {
            assert!(snapshot.is_consistent());
            observer.set(observer.get() + 1);
        });

        engine.add_items(vec![item("d")]);
        let second = engine.create_profile();
        engine.rename_profile(&second, "Maria").unwrap();
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("d".into()),
            target: Some(second.clone()),
        });
        engine.delete_profile(&second).unwrap();

        assert_eq!(notified.get(), 5);
    }

    #[test]
    fn test_save_failures_keep_the_session_running() {
        struct FailingRepository;

        impl Repository for FailingRepository {
            fn load(&mut self) -> Snapshot {
                Snapshot::seeded()
            }

            fn save(&mut self, _snapshot: &Snapshot) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("disk unplugged".into()))
            }
        }

        let mut engine = PlacementEngine::with_repository(Box::new(FailingRepository));

        assert_eq!(engine.add_items(vec![item("a")]), 1);
        let transfer = engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });
        assert_eq!(transfer.map(|t| t.to), Some(aluno()));
    }

    #[test]
    fn test_full_sorting_session() {
        let mut engine = seeded_engine();

        let maria = engine.create_profile();
        engine.rename_profile(&maria, "Maria").unwrap();

        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(aluno()),
        });
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("b".into()),
            target: Some(maria.clone()),
        });
        engine.apply(PlacementEvent::DragEnd {
            item: ItemId("a".into()),
            target: Some(maria.clone()),
        });

        assert_eq!(engine.snapshot().gallery.len(), 1);
        assert_eq!(engine.snapshot().profiles.get(&maria).unwrap().items.len(), 2);
        assert!(engine.snapshot().has_items());

        let name = engine.delete_profile(&maria).unwrap();
        assert_eq!(name, "Maria");
        assert_eq!(engine.snapshot().gallery.len(), 3);
        assert!(engine.snapshot().is_consistent());
    }
}
