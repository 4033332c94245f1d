//! Save/Load functionality for persisting game state
//!
//! Game state lives in a flat key-value store modeled on the original web
//! save layout: string keys, JSON-encoded string values, one key per
//! concern. `MemoryStore` keeps the map in memory; `FileStore` mirrors it
//! through a bincode-encoded versioned snapshot on disk.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Key layout of a save. One key per concern, all values JSON.
pub mod keys {
    /// `Vec<Egg>` currently incubating.
    pub const INCUBATOR: &str = "incubator";
    /// `Vec<Option<Creature>>`, fixed capacity, `null` for empty slots.
    pub const PC: &str = "pc";
    /// `Vec<Filter>` in authoring order.
    pub const FILTERS: &str = "filters";
    /// Lifetime hatch counter.
    pub const EGG_HATCHED: &str = "eggHatched";
    /// Lifetime shiny hatch counter.
    pub const SHINY_HATCHED: &str = "shinyHatched";
    /// Rare candy balance.
    pub const RARE_CANDY: &str = "rareCandy";
    /// Pokedollar balance.
    pub const POKEDOLLARS: &str = "pokedollars";
    /// Global pause flag.
    pub const PAUSED: &str = "paused";
    /// `UpgradeLevels`.
    pub const UPGRADES: &str = "upgrades";
    /// `DaycareState`: breeders, timers, egg queue.
    pub const DAYCARE: &str = "daycare";
    /// Epoch ms of the last recorded activity, for offline catch-up.
    pub const LAST_ACTIVE: &str = "lastActiveTime";
    /// Where the incubator pulls new eggs from: "shelter" or "daycare".
    pub const EGG_SOURCE: &str = "eggSource";
}

/// String-keyed store for save data, mirroring the original storage surface.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    /// All stored keys. Order is stable for a given store contents.
    fn keys(&self) -> Vec<String>;
    fn clear(&mut self);
}

/// Read a key and decode it as JSON. Malformed values are logged and
/// treated as absent so one bad key never takes the whole save down.
pub fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding malformed save value for '{}': {}", key, e);
            None
        }
    }
}

/// Encode a value as JSON and write it under `key`.
pub fn write_json<T, S>(store: &mut S, key: &str, value: &T)
where
    T: Serialize,
    S: KvStore + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => log::error!("Failed to encode save value for '{}': {}", key, e),
    }
}

/// In-memory store. The default for tests and the simulation harness.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Serializable snapshot of the whole key-value map
#[derive(Serialize, Deserialize)]
struct SaveData {
    /// Save format version
    version: u32,
    /// Every stored key and its JSON value
    entries: BTreeMap<String, String>,
}

/// Write a snapshot of `entries` to a writer.
pub fn save_entries<W: Write>(
    writer: W,
    entries: &BTreeMap<String, String>,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        entries: entries.clone(),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a snapshot from a reader.
pub fn load_entries<R: Read>(reader: R) -> Result<BTreeMap<String, String>, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    Ok(save_data.entries)
}

/// File-backed store. The map is held in memory and re-snapshotted to disk
/// after every mutation, matching the synchronous durability of the
/// original storage. Write failures are logged, not surfaced, so gameplay
/// never stops on a bad disk; hosts that want a hard guarantee call
/// `persist` directly.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`, loading the existing snapshot if there is
    /// one. A missing file is an empty save, not an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SaveError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            load_entries(reader)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Write the current map to disk.
    pub fn persist(&self) -> Result<(), SaveError> {
        let writer = BufWriter::new(File::create(&self.path)?);
        save_entries(writer, &self.entries)
    }

    fn autosave(&self) {
        if let Err(e) = self.persist() {
            log::warn!("Autosave to {} failed: {}", self.path.display(), e);
        }
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.autosave();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.autosave();
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.autosave();
    }
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
