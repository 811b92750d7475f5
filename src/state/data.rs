use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an uploaded image.
/// Opaque and unique across the whole application; freshly
/// uploaded files get a UUID v4 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Generate a fresh id for a newly uploaded image
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a profile container.
/// New profiles derive their id from the creation timestamp;
/// ids loaded from storage are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl ProfileId {
    /// Build a time-based id from a millisecond timestamp
    pub fn from_timestamp(millis: i64) -> Self {
        Self(format!("profile-{millis}"))
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single uploaded image.
/// The serialized shape of these structs is the persistence format,
/// so changes here must stay readable against previously stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique id assigned at upload
    pub id: ItemId,
    /// Path of the imported copy of the image bytes
    pub url: String,
}

impl Item {
    pub fn new(id: ItemId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }
}

/// A named profile container and the images it owns.
/// The profile's id is the key it is stored under in the
/// profile registry, so it is not repeated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Human-readable label; never empty after trimming
    pub name: String,
    /// Images owned by this profile, in the order they were dropped
    pub items: Vec<Item>,
}

impl Profile {
    /// Create an empty profile with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_serializes_to_flat_json() {
        let item = Item::new(ItemId("abc-123".into()), "/tmp/abc-123.png");
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value, json!({ "id": "abc-123", "url": "/tmp/abc-123.png" }));
    }

    #[test]
    fn test_fresh_item_ids_are_unique() {
        assert_ne!(ItemId::new(), ItemId::new());
    }

    #[test]
    fn test_profile_json_shape_matches_stored_format() {
        let mut profile = Profile::named("João Pedro");
        profile.items.push(Item::new(ItemId("a".into()), "/tmp/a.jpg"));
        profile.items.push(Item::new(ItemId("b".into()), "/tmp/b.jpg"));

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "João Pedro",
                "items": [
                    { "id": "a", "url": "/tmp/a.jpg" },
                    { "id": "b", "url": "/tmp/b.jpg" },
                ],
            })
        );
    }
}
