use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{ProgressSnapshot, ReviewStore};
use crate::error::{Result, StoreError};
use crate::types::ReviewState;

/// File name used when a store is opened inside a data directory.
pub const DEFAULT_PROGRESS_FILE: &str = "hsk_progress.json";

/// Local store that keeps the whole progress map as one JSON blob on disk.
///
/// The blob is loaded once on open and rewritten on every change. Unreadable
/// records are repaired or dropped on load rather than failing the open.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    states: Mutex<ProgressSnapshot>,
}

impl JsonFileStore {
    /// Open (or start) the blob at `path`. A missing file is an empty store.
    ///
    /// A file that is not a JSON object is moved to [`Self::corrupt_path`]
    /// and the store starts empty, so the next write cannot clobber it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let states = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(value) if value.is_object() => ProgressSnapshot::from_value(value).snapshot,
                _ => {
                    fs::rename(&path, corrupt_path(&path))?;
                    ProgressSnapshot::new()
                }
            }
        } else {
            ProgressSnapshot::new()
        };

        Ok(Self {
            path,
            states: Mutex::new(states),
        })
    }

    /// Open the default blob inside `data_dir`, creating the directory.
    pub fn open_in(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        Self::open(data_dir.join(DEFAULT_PROGRESS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable blob is set aside on open.
    pub fn corrupt_path(&self) -> PathBuf {
        corrupt_path(&self.path)
    }

    fn persist(&self, states: &ProgressSnapshot) -> Result<()> {
        let content = states.to_json()?;
        // Write beside the target and rename so a crash never leaves half a blob.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    path.with_extension("json.corrupt")
}

impl ReviewStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<ReviewState>> {
        let states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(states.get(key).cloned())
    }

    fn put(&self, key: &str, state: ReviewState) -> Result<()> {
        let mut states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        let previous = states.insert(key, state);
        if let Err(e) = self.persist(&states) {
            // keep memory and disk in agreement
            match previous {
                Some(previous) => states.insert(key, previous),
                None => states.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn all(&self) -> Result<ProgressSnapshot> {
        let states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(states.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut states = self.states.lock().map_err(|_| StoreError::Poisoned)?;
        self.persist(&ProgressSnapshot::new())?;
        states.clear();
        Ok(())
    }
}
