/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The unsorted gallery registry (gallery.rs)
/// - The profile registry (profiles.rs)
/// - The placement engine and its drag events (placement.rs)
/// - SQLite-backed persistence (store.rs)

pub mod data;
pub mod gallery;
pub mod placement;
pub mod profiles;
pub mod store;
