use std::fs;
use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::gallery::GalleryRegistry;
use super::placement::{Repository, Snapshot};
use super::profiles::ProfileRegistry;

/// Storage key for the unsorted gallery sequence.
pub const GALLERY_KEY: &str = "galleryImages";
/// Storage key for the profile map.
pub const PROFILES_KEY: &str = "userProfiles";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Typed key-value wrapper over the SQLite catalog database.
/// Values are stored as JSON strings in a single `kv_store` table.
pub struct KvStore {
    conn: Connection,
    db_path: PathBuf,
}

impl KvStore {
    /// Open (or create) the store at the default location.
    ///
    /// The database file lives in the user's data directory:
    /// - Linux: ~/.local/share/face-gallery/face_gallery.db
    /// - macOS: ~/Library/Application Support/face-gallery/face_gallery.db
    /// - Windows: %APPDATA%\face-gallery\face_gallery.db
    pub fn open_default() -> Result<Self, StoreError> {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .ok_or_else(|| StoreError::Unavailable("no user data directory".into()))?;

        path.push("face-gallery");
        path.push("face_gallery.db");
        Self::open(path)
    }

    /// Open (or create) the store at an explicit path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let db_path = db_path.into();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        println!("📁 Database initialized at: {}", db_path.display());

        let mut store = KvStore { conn, db_path };
        store.init_schema()?;
        Ok(store)
    }

    /// Create the key-value table if it does not exist yet.
    fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Read the value stored under `key`, or initialize it.
    ///
    /// A missing key is written back with `default` so the first session
    /// persists its starting state. A value that fails to parse leaves the
    /// stored bytes alone and returns `default` for this session.
    pub fn read<T>(&mut self, key: &str, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        match self.try_read(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                if let Err(error) = self.write(key, &default) {
                    eprintln!("⚠️  Failed to initialize '{}': {}", key, error);
                }
                default
            }
            Err(error) => {
                eprintln!("⚠️  Failed to read '{}': {}", key, error);
                default
            }
        }
    }

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let stored: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        match stored {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it under `key`, replacing any
    /// previous value.
    pub fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, json],
        )?;
        Ok(())
    }

    /// Replace the value under `key` with a function of the current stored
    /// value. Returns the value that was written.
    pub fn update<T, F>(&mut self, key: &str, default: T, apply: F) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let next = apply(self.read(key, default));
        self.write(key, &next)?;
        Ok(next)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Repository persisting the snapshot as two JSON values in the key-value
/// store, one for the gallery and one for the profile map.
pub struct SqliteRepository {
    store: KvStore,
}

impl SqliteRepository {
    /// Open the backing store at the default location.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(SqliteRepository {
            store: KvStore::open_default()?,
        })
    }

    /// Open the backing store at an explicit path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(SqliteRepository {
            store: KvStore::open(db_path)?,
        })
    }
}

impl Repository for SqliteRepository {
    fn load(&mut self) -> Snapshot {
        Snapshot {
            gallery: self.store.read(GALLERY_KEY, GalleryRegistry::default()),
            profiles: self.store.read(PROFILES_KEY, ProfileRegistry::seeded()),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        // Attempt both writes before reporting the first failure.
        let gallery = self.store.write(GALLERY_KEY, &snapshot.gallery);
        let profiles = self.store.write(PROFILES_KEY, &snapshot.profiles);
        gallery.and(profiles)
    }
}

/// Fallback repository keeping the snapshot in process memory only.
/// Used when no database can be opened; state lasts for the session.
pub struct MemoryRepository {
    snapshot: Snapshot,
}

impl MemoryRepository {
    pub fn new(snapshot: Snapshot) -> Self {
        MemoryRepository { snapshot }
    }
}

impl Repository for MemoryRepository {
    fn load(&mut self) -> Snapshot {
        self.snapshot.clone()
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.snapshot = snapshot.clone();
        Ok(())
    }
}
