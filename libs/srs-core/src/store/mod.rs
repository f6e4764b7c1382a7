//! Persistence contract for review states.
//!
//! The scheduler never touches storage. Callers read a state through a
//! [`ReviewStore`], grade it, and write it back.

mod file;
mod memory;
mod snapshot;

pub use file::{JsonFileStore, DEFAULT_PROGRESS_FILE};
pub use memory::MemoryStore;
pub use snapshot::{supersedes, DecodedProgress, ProgressSnapshot};

use crate::error::Result;
use crate::types::ReviewState;

/// Key-value store of review states keyed by item identity.
///
/// Implementations guard their own data, but a get followed by a put is not
/// atomic: at most one writer per item is the caller's responsibility.
pub trait ReviewStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<ReviewState>>;

    fn put(&self, key: &str, state: ReviewState) -> Result<()>;

    /// Every stored state.
    fn all(&self) -> Result<ProgressSnapshot>;

    /// Bulk reset: forget all progress.
    fn clear(&self) -> Result<()>;

    /// Fold a snapshot from elsewhere (another device, a backup) into this
    /// store. Returns how many keys changed.
    fn merge(&self, incoming: ProgressSnapshot) -> Result<usize> {
        let mut changed = 0;
        for (key, state) in incoming {
            if supersedes(self.get(&key)?.as_ref(), &state) {
                self.put(&key, state)?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
