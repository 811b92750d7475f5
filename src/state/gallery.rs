use serde::{Deserialize, Serialize};

use super::data::{Item, ItemId};

/// The unsorted gallery: every uploaded image lives here until it is
/// dropped onto a profile. Upload order is preserved.
///
/// Serializes transparently as a plain sequence of items, which is the
/// shape stored under the `galleryImages` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GalleryRegistry {
    items: Vec<Item>,
}

impl GalleryRegistry {
    /// Append items to the end of the gallery, preserving existing order.
    /// Items whose id is already present are skipped, not errors.
    /// Returns how many items were actually appended.
    pub fn add(&mut self, items: Vec<Item>) -> usize {
        let mut added = 0;
        for item in items {
            if !self.contains(&item.id) {
                self.items.push(item);
                added += 1;
            }
        }
        added
    }

    /// Remove and return the item with the given id.
    /// Absent ids are a no-op, so the call is safe to repeat after a
    /// transfer has already taken the item out.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let position = self.items.iter().position(|item| item.id == *id)?;
        Some(self.items.remove(position))
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| item.id == *id)
    }

    /// The current ordered sequence of unsorted items
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Item {
        Item::new(ItemId(id.into()), format!("/tmp/{id}.jpg"))
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut gallery = GalleryRegistry::default();
        gallery.add(vec![item("a"), item("b")]);
        gallery.add(vec![item("c")]);

        let ids: Vec<&str> = gallery.items().iter().map(|i| i.id.0.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_add_skips_duplicate_ids() {
        let mut gallery = GalleryRegistry::default();
        assert_eq!(gallery.add(vec![item("a"), item("b")]), 2);
        assert_eq!(gallery.add(vec![item("b"), item("c")]), 1);
        assert_eq!(gallery.len(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut gallery = GalleryRegistry::default();
        gallery.add(vec![item("a"), item("b")]);

        let removed = gallery.remove(&ItemId("a".into()));
        assert_eq!(removed.map(|i| i.id.0), Some("a".to_string()));

        // Second removal of the same id is a quiet no-op.
        assert!(gallery.remove(&ItemId("a".into())).is_none());
        assert_eq!(gallery.len(), 1);
    }
}
