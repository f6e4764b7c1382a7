//! Study helpers shared by the study and stats endpoints.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hsk_srs_core::{Performance, ReviewState, Scheduler};

use crate::error::{ApiError, Result};
use crate::models::QueueEntry;

/// Longest accepted item key, in bytes.
pub const MAX_ITEM_KEY_LEN: usize = 256;

/// Most keys accepted in one queue request.
pub const MAX_QUEUE_ITEMS: usize = 10_000;

/// Validate and normalize an item key from a request.
pub fn validate_item_key(raw: &str) -> Result<String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(ApiError::BadRequest("item_key must not be empty".to_string()));
    }
    if key.len() > MAX_ITEM_KEY_LEN {
        return Err(ApiError::BadRequest(format!(
            "item_key longer than {} bytes",
            MAX_ITEM_KEY_LEN
        )));
    }
    Ok(key.to_string())
}

/// Parse a grade name from a request body.
pub fn parse_performance(raw: &str) -> Result<Performance> {
    Ok(raw.parse::<Performance>()?)
}

/// Validate the keys of a queue request, dropping repeats but keeping the
/// first occurrence's position.
pub fn validate_queue_items(raw: &[String]) -> Result<Vec<String>> {
    if raw.len() > MAX_QUEUE_ITEMS {
        return Err(ApiError::BadRequest(format!(
            "at most {} items per request",
            MAX_QUEUE_ITEMS
        )));
    }

    let mut seen = std::collections::HashSet::with_capacity(raw.len());
    let mut keys = Vec::with_capacity(raw.len());
    for item in raw {
        let key = validate_item_key(item)?;
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    Ok(keys)
}

/// Prioritize `keys` against the stored states.
///
/// Returns the entries after the optional limit, plus how many candidates
/// there were before it.
pub fn build_queue(
    scheduler: &Scheduler,
    keys: Vec<String>,
    states: &HashMap<String, ReviewState>,
    only_due: bool,
    limit: Option<usize>,
    now: DateTime<Utc>,
) -> (Vec<QueueEntry>, usize) {
    let candidates = keys
        .into_iter()
        .filter(|key| !only_due || scheduler.is_due(states.get(key), now));
    let mut ordered = scheduler.prioritize(candidates, |key| states.get(key), now);
    let available = ordered.len();

    if let Some(limit) = limit {
        ordered.truncate(limit);
    }

    let entries = ordered
        .into_iter()
        .map(|key| {
            let status = scheduler.describe_status(states.get(&key), now);
            QueueEntry {
                item_key: key,
                status,
            }
        })
        .collect();

    (entries, available)
}
