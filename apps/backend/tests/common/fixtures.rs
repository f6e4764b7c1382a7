//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use hsk_flashcards_backend::models::{
    DeviceRegisterRequest, StudyQueueRequest, SubmitReviewRequest,
};

/// Create a device register request.
pub fn device_register_request(name: Option<&str>) -> DeviceRegisterRequest {
    DeviceRegisterRequest {
        name: name.map(|s| s.to_string()),
    }
}

/// Create a review submission for a single item.
pub fn submit_review_request(item_key: &str, performance: &str) -> SubmitReviewRequest {
    SubmitReviewRequest {
        item_key: item_key.to_string(),
        performance: performance.to_string(),
    }
}

/// Create a study queue request.
pub fn queue_request(items: &[&str], only_due: bool, limit: Option<usize>) -> StudyQueueRequest {
    StudyQueueRequest {
        items: items.iter().map(|s| s.to_string()).collect(),
        only_due,
        limit,
    }
}

/// Item key that won't collide with other test runs.
///
/// Keys built from ASCII input are safe to use as path segments.
pub fn unique_item_key(character: &str) -> String {
    format!("{}_test-{}", character, Uuid::new_v4().simple())
}

/// One stored record in the persisted progress format.
pub fn progress_record(
    interval: u32,
    ease_factor: f64,
    repetitions: u32,
    last_reviewed_at: DateTime<Utc>,
    last_performance: &str,
) -> serde_json::Value {
    let next = last_reviewed_at + chrono::Duration::days(i64::from(interval));
    json!({
        "interval": interval,
        "easeFactor": ease_factor,
        "repetitions": repetitions,
        "lastReviewedAt": last_reviewed_at.timestamp_millis(),
        "nextReviewAt": next.timestamp_millis(),
        "lastPerformance": last_performance,
    })
}
