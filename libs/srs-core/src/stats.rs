//! Progress summaries over a set of vocabulary items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Performance, ReviewState};

/// Interval (days) from which an item counts as mature.
pub const MATURE_INTERVAL: u32 = 21;

/// Consecutive successful reviews before an item leaves the learning pile.
pub const LEARNED_REPETITIONS: u32 = 3;

/// Study statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total: usize,
    pub new: usize,
    /// Reviewed items whose next review has come up.
    pub due: usize,
    pub learning: usize,
    pub mature: usize,
    pub average_ease: f64,
    pub average_interval: f64,
}

impl ProgressStats {
    /// Summarize `keys`, looking each one up with `lookup`.
    pub fn summarize<'a, K, I, F>(keys: I, lookup: F, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = K>,
        F: Fn(&K) -> Option<&'a ReviewState>,
    {
        let mut stats = Self::default();
        let mut ease_sum = 0.0;
        let mut interval_sum = 0.0;

        for key in keys {
            stats.total += 1;
            let Some(state) = lookup(&key) else {
                stats.new += 1;
                continue;
            };

            if state.next_review_at() <= now {
                stats.due += 1;
            }
            if state.repetitions() < LEARNED_REPETITIONS
                || state.last_performance() == Some(Performance::Again)
            {
                stats.learning += 1;
            }
            if state.interval() >= MATURE_INTERVAL {
                stats.mature += 1;
            }
            ease_sum += state.ease_factor();
            interval_sum += f64::from(state.interval());
        }

        let reviewed = stats.total - stats.new;
        if reviewed > 0 {
            stats.average_ease = ease_sum / reviewed as f64;
            stats.average_interval = interval_sum / reviewed as f64;
        }
        stats
    }
}
