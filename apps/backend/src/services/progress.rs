//! Progress blob handling for uploads and downloads.

use std::collections::HashMap;

use hsk_srs_core::store::supersedes;
use hsk_srs_core::{DecodedProgress, ProgressSnapshot, ReviewState};

use crate::models::DbReviewState;
use crate::services::study::validate_item_key;

/// Earliest instant a `timestamptz` column accepts (4714-11-24 BC, Julian day 0).
pub const EARLIEST_STORABLE_MS: i64 = -210_866_803_200_000;

/// Whether every timestamp of `state` fits the database column range.
pub fn is_storable(state: &ReviewState) -> bool {
    state.last_reviewed_at().timestamp_millis() >= EARLIEST_STORABLE_MS
        && state.next_review_at().timestamp_millis() >= EARLIEST_STORABLE_MS
}

/// Decode an uploaded progress blob, logging anything that had to be dropped.
///
/// Keys are normalized the way the study endpoints normalize them. Entries
/// with invalid keys or unstorable timestamps are dropped; when two keys
/// normalize to the same item, the later review wins.
pub fn decode_upload(body: serde_json::Value) -> DecodedProgress {
    if !body.is_object() {
        tracing::warn!("Progress upload is not an object; treating as empty");
    }

    let decoded = ProgressSnapshot::from_value(body);
    let mut dropped = decoded.dropped;
    let mut snapshot = ProgressSnapshot::new();

    for (raw_key, state) in decoded.snapshot {
        let key = match validate_item_key(&raw_key) {
            Ok(key) if is_storable(&state) => key,
            _ => {
                dropped.push(raw_key);
                continue;
            }
        };
        if supersedes(snapshot.get(&key), &state) {
            snapshot.insert(key, state);
        }
    }

    if !dropped.is_empty() {
        tracing::warn!(
            "Dropped {} unusable progress entries: {:?}",
            dropped.len(),
            dropped
        );
    }
    DecodedProgress { snapshot, dropped }
}

/// Rows to snapshot.
pub fn snapshot_from_rows(rows: Vec<DbReviewState>) -> ProgressSnapshot {
    rows.into_iter()
        .map(|row| {
            let state = row.to_core_state();
            (row.item_key, state)
        })
        .collect()
}

/// Rows to a key lookup map.
pub fn states_by_key(rows: Vec<DbReviewState>) -> HashMap<String, ReviewState> {
    rows.into_iter()
        .map(|row| {
            let state = row.to_core_state();
            (row.item_key, state)
        })
        .collect()
}
