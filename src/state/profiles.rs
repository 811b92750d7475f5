use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::data::{Item, ItemId, Profile, ProfileId};

/// Name given to freshly created profiles until the user renames them.
pub const NEW_PROFILE_NAME: &str = "New Profile";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile name cannot be empty")]
    InvalidName,
    #[error("no profile with id {0}")]
    NotFound(ProfileId),
}

/// All user profiles, keyed by id. A `BTreeMap` keeps iteration, and with
/// it the rendered card order, stable across runs. Timestamp-derived ids
/// sort in creation order.
///
/// Serializes transparently as an id-keyed object, which is the shape
/// stored under the `userProfiles` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRegistry {
    profiles: BTreeMap<ProfileId, Profile>,
}

impl ProfileRegistry {
    /// Registry holding the default profile present on first launch.
    pub fn seeded() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(ProfileId("aluno-1".into()), Profile::named("João Pedro"));
        Self { profiles }
    }

    /// Create an empty profile named [`NEW_PROFILE_NAME`] and return its id.
    pub fn create(&mut self) -> ProfileId {
        self.create_at(Utc::now().timestamp_millis())
    }

    /// Ids derive from the wall clock; a numeric suffix keeps them unique
    /// when two creations land on the same millisecond.
    fn create_at(&mut self, millis: i64) -> ProfileId {
        let mut id = ProfileId::from_timestamp(millis);
        let mut bump = 1;
        while self.profiles.contains_key(&id) {
            id = ProfileId(format!("profile-{millis}-{bump}"));
            bump += 1;
        }
        self.profiles
            .insert(id.clone(), Profile::named(NEW_PROFILE_NAME));
        id
    }

    /// Rename a profile. The name must contain something other than
    /// whitespace, but is stored exactly as typed.
    pub fn rename(&mut self, id: &ProfileId, name: &str) -> Result<(), ProfileError> {
        if name.trim().is_empty() {
            return Err(ProfileError::InvalidName);
        }
        let profile = self
            .profiles
            .get_mut(id)
            .ok_or_else(|| ProfileError::NotFound(id.clone()))?;
        profile.name = name.to_string();
        Ok(())
    }

    /// Remove a profile, handing back its record so the caller decides what
    /// happens to any items it still held.
    pub fn delete(&mut self, id: &ProfileId) -> Result<Profile, ProfileError> {
        self.profiles
            .remove(id)
            .ok_or_else(|| ProfileError::NotFound(id.clone()))
    }

    /// Append an item to the end of a profile's collection.
    pub fn append_item(&mut self, id: &ProfileId, item: Item) -> Result<(), ProfileError> {
        let profile = self
            .profiles
            .get_mut(id)
            .ok_or_else(|| ProfileError::NotFound(id.clone()))?;
        profile.items.push(item);
        Ok(())
    }

    /// Remove and return an item from a profile, if both exist.
    pub fn take_item(&mut self, id: &ProfileId, item: &ItemId) -> Option<Item> {
        let profile = self.profiles.get_mut(id)?;
        let position = profile.items.iter().position(|i| i.id == *item)?;
        Some(profile.items.remove(position))
    }

    /// The profile currently holding the given item, if any.
    pub fn find_item(&self, item: &ItemId) -> Option<&ProfileId> {
        self.profiles
            .iter()
            .find(|(_, profile)| profile.items.iter().any(|i| i.id == *item))
            .map(|(id, _)| id)
    }

    pub fn get(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.get(id)
    }

    pub fn contains(&self, id: &ProfileId) -> bool {
        self.profiles.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProfileId, &Profile)> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Total number of items held across all profiles.
    pub fn item_count(&self) -> usize {
        self.profiles.values().map(|p| p.items.len()).sum()
    }
}
