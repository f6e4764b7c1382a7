use std::sync::RwLock;

use super::{ProgressSnapshot, ReviewStore};
use crate::error::{Result, StoreError};
use crate::types::ReviewState;

/// Process-local store, mostly for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    states: RwLock<ProgressSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            states: RwLock::new(snapshot),
        }
    }
}

impl ReviewStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<ReviewState>> {
        let states = self.states.read().map_err(|_| StoreError::Poisoned)?;
        Ok(states.get(key).cloned())
    }

    fn put(&self, key: &str, state: ReviewState) -> Result<()> {
        let mut states = self.states.write().map_err(|_| StoreError::Poisoned)?;
        states.insert(key, state);
        Ok(())
    }

    fn all(&self) -> Result<ProgressSnapshot> {
        let states = self.states.read().map_err(|_| StoreError::Poisoned)?;
        Ok(states.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut states = self.states.write().map_err(|_| StoreError::Poisoned)?;
        states.clear();
        Ok(())
    }
}
