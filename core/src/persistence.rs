use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::*;

/// String key-value storage the game persists into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> core::result::Result<(), StorageError>;
}

/// Associates a type with the storage key it is saved under.
pub trait StorageKey {
    const KEY: &'static str;
}

impl StorageKey for SavedSession {
    const KEY: &'static str = "gameState";
}

/// JSON round trip through a [`KeyValueStore`], where every failure reads as "nothing saved".
pub trait Persisted: StorageKey + Serialize + DeserializeOwned + Sized {
    fn load_from(store: &impl KeyValueStore) -> Option<Self> {
        let text = match store.get(Self::KEY) {
            Ok(text) => text?,
            Err(err) => {
                log::error!("could not read {}: {}", Self::KEY, err);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("ignoring corrupt {}: {}", Self::KEY, err);
                None
            }
        }
    }

    fn save_to(&self, store: &mut impl KeyValueStore) -> bool {
        let result = serde_json::to_string(self)
            .map_err(StorageError::from)
            .and_then(|text| store.set(Self::KEY, &text));
        if let Err(err) = result {
            log::error!("could not save {}: {}", Self::KEY, err);
            return false;
        }
        true
    }
}

impl<T: StorageKey + Serialize + DeserializeOwned> Persisted for T {}

pub fn best_time_key(difficulty: Difficulty) -> String {
    format!("bestTime_{}", difficulty.key())
}

pub fn load_best_time(store: &impl KeyValueStore, difficulty: Difficulty) -> Option<f64> {
    let key = best_time_key(difficulty);
    match store.get(&key) {
        Ok(text) => text.and_then(|text| match text.trim().parse() {
            Ok(time) => Some(time),
            Err(err) => {
                log::error!("ignoring unreadable {}: {:?} ({})", key, text, err);
                None
            }
        }),
        Err(err) => {
            log::error!("could not read {}: {}", key, err);
            None
        }
    }
}

pub fn load_best_times(store: &impl KeyValueStore) -> BestTimes {
    Difficulty::ALL
        .into_iter()
        .filter_map(|difficulty| Some((difficulty, load_best_time(store, difficulty)?)))
        .collect()
}

/// Stores `time` if it beats the saved best for `difficulty`. Returns whether it did.
pub fn save_best_time(store: &mut impl KeyValueStore, difficulty: Difficulty, time: f64) -> bool {
    if !(time > 0.0) {
        log::warn!("not saving invalid time {} for {}", time, difficulty);
        return false;
    }
    if let Some(best) = load_best_time(store, difficulty) {
        if best <= time {
            log::debug!("{} best time stays at {} (got {})", difficulty, best, time);
            return false;
        }
    }

    let key = best_time_key(difficulty);
    match store.set(&key, &time.to_string()) {
        Ok(()) => {
            log::info!("new best time for {}: {}", difficulty, time);
            true
        }
        Err(err) => {
            log::error!("could not save {}: {}", key, err);
            false
        }
    }
}

/// Store subscriber that saves competitive progress whenever it changes.
pub fn session_saver<S: KeyValueStore + 'static>(
    store: Rc<RefCell<S>>,
) -> impl FnMut(&GameState, &Action, &GameState) + 'static {
    move |previous, _action, next| {
        let session = next.session();
        if next.mode == Mode::Competitive && session != previous.session() {
            session.save_to(&mut *store.borrow_mut());
        }
    }
}

/// In-memory storage, mostly for tests and ephemeral sessions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> core::result::Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Key-value storage kept as one JSON object in a file, rewritten on every change.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(StorageError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no saved data at {}", path.display());
                BTreeMap::new()
            }
            Err(err) => {
                log::error!("ignoring saved data at {}: {}", path.display(), err);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> core::result::Result<BTreeMap<String, String>, StorageError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn flush(&self) -> core::result::Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> core::result::Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
