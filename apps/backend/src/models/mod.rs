//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from hsk-srs-core
pub use hsk_srs_core::{
    Performance, ProgressSnapshot, ProgressStats, ReviewState, ReviewStatus,
};

// === Database Entity Types ===

/// Device registration info
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Review state row in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewState {
    pub device_id: Uuid,
    pub item_key: String,
    pub interval_days: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub last_reviewed_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub last_performance: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DbReviewState {
    /// Create from hsk-srs-core ReviewState
    pub fn from_core_state(device_id: Uuid, item_key: &str, state: &ReviewState) -> Self {
        Self {
            device_id,
            item_key: item_key.to_string(),
            interval_days: i32::try_from(state.interval()).unwrap_or(i32::MAX),
            ease_factor: state.ease_factor(),
            repetitions: i32::try_from(state.repetitions()).unwrap_or(i32::MAX),
            last_reviewed_at: state.last_reviewed_at(),
            next_review_at: state.next_review_at(),
            last_performance: state.last_performance().map(|p| p.as_str().to_string()),
            updated_at: Utc::now(),
        }
    }

    /// Convert to hsk-srs-core ReviewState.
    ///
    /// `next_review_at` is re-derived from the last review and interval, and
    /// out-of-range values fall back to the new-item defaults.
    pub fn to_core_state(&self) -> ReviewState {
        ReviewState::new(
            u32::try_from(self.interval_days).unwrap_or(1),
            self.ease_factor,
            u32::try_from(self.repetitions).unwrap_or(0),
            self.last_reviewed_at,
            self.last_performance
                .as_deref()
                .and_then(|p| p.parse::<Performance>().ok()),
        )
    }
}

/// Review log record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReview {
    pub id: Uuid,
    pub device_id: Uuid,
    pub item_key: String,
    pub performance: String,
    pub reviewed_at: DateTime<Utc>,
    pub interval_before: Option<i32>,
    pub interval_after: i32,
    pub ease_before: Option<f64>,
    pub ease_after: f64,
    pub created_at: DateTime<Utc>,
}

impl DbReview {
    /// Log entry for one grading event.
    pub fn record(
        device_id: Uuid,
        item_key: &str,
        before: Option<&ReviewState>,
        after: &ReviewState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
            item_key: item_key.to_string(),
            performance: after
                .last_performance()
                .map_or("none", Performance::as_str)
                .to_string(),
            reviewed_at: after.last_reviewed_at(),
            interval_before: before.map(|s| i32::try_from(s.interval()).unwrap_or(i32::MAX)),
            interval_after: i32::try_from(after.interval()).unwrap_or(i32::MAX),
            ease_before: before.map(ReviewState::ease_factor),
            ease_after: after.ease_factor(),
            created_at: Utc::now(),
        }
    }
}

// === API Request/Response Types ===

/// Device register request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegisterRequest {
    pub name: Option<String>,
}

/// Device register response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegisterResponse {
    pub device_id: Uuid,
    pub token: String,
}

/// Device status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatusResponse {
    pub device_id: Uuid,
    pub last_seen_at: DateTime<Utc>,
}

/// Submit review request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub item_key: String,
    pub performance: String,
}

/// Submit review response
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReviewResponse {
    pub item_key: String,
    pub state: ReviewState,
    pub status: ReviewStatus,
}

/// Item status response
#[derive(Debug, Clone, Serialize)]
pub struct ItemStatusResponse {
    pub item_key: String,
    pub status: ReviewStatus,
}

/// Study queue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyQueueRequest {
    pub items: Vec<String>,
    #[serde(default)]
    pub only_due: bool,
    pub limit: Option<usize>,
}

/// One prioritized queue entry
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub item_key: String,
    pub status: ReviewStatus,
}

/// Study queue response
#[derive(Debug, Clone, Serialize)]
pub struct StudyQueueResponse {
    pub items: Vec<QueueEntry>,
    /// Candidates left after the due filter, before the limit.
    pub available: usize,
}

/// Progress upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadProgressResponse {
    /// Entries that replaced (or created) a stored state.
    pub merged: usize,
    /// Keys whose uploaded records were unusable.
    pub dropped: Vec<String>,
    /// States stored for the device after the merge.
    pub total: usize,
}

/// Progress reset response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetProgressResponse {
    pub deleted: u64,
}
