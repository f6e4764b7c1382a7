//! Core spaced repetition library shared by the HSK flashcard apps.
//!
//! Provides:
//! - Pure SM-2 style scheduler (grading, due checks, review ordering)
//! - Review state model with lenient decoding of persisted records
//! - Store contract plus in-memory and JSON file stores
//! - Injectable clocks
//! - Vocabulary catalog and identity keys
//! - Progress statistics

pub mod catalog;
pub mod clock;
pub mod error;
pub mod review;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod types;

pub use catalog::{item_key, Catalog, VocabularyItem};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CatalogError, ParsePerformanceError, Result, StoreError};
pub use review::ReviewService;
pub use scheduler::Scheduler;
pub use stats::ProgressStats;
pub use store::{DecodedProgress, JsonFileStore, MemoryStore, ProgressSnapshot, ReviewStore};
pub use types::{performance_label, Performance, ReviewState, ReviewStatus};
