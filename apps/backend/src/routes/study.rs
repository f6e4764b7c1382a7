//! Study endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::db::Database;
use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::progress::states_by_key;
use crate::services::study::{build_queue, parse_performance, validate_item_key, validate_queue_items};
use crate::AppState;
use hsk_srs_core::Clock;

/// POST /api/study/review
/// Grade an item and persist its next review state
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    let item_key = validate_item_key(&payload.item_key)?;
    let performance = parse_performance(&payload.performance)?;

    // Lock the row so concurrent grades of one item apply in sequence.
    let mut tx = state.db.begin().await?;
    let current = Database::lock_review_state(&mut *tx, auth.device_id, &item_key)
        .await?
        .map(|s| s.to_core_state());

    let now = state.clock.now();
    let next = state.scheduler.grade(current.as_ref(), performance, now);

    let row = DbReviewState::from_core_state(auth.device_id, &item_key, &next);
    Database::upsert_review_state(&mut *tx, &row).await?;

    let log = DbReview::record(auth.device_id, &item_key, current.as_ref(), &next);
    Database::insert_review(&mut *tx, &log).await?;
    tx.commit().await?;

    tracing::debug!(
        "Graded {} as {} for device {}: interval {} -> {}",
        item_key,
        performance,
        auth.device_id,
        current.as_ref().map_or(0, |s| s.interval()),
        next.interval()
    );

    let status = state.scheduler.describe_status(Some(&next), now);
    Ok(Json(SubmitReviewResponse {
        item_key,
        state: next,
        status,
    }))
}

/// GET /api/study/status/:item_key
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(item_key): Path<String>,
) -> Result<Json<ItemStatusResponse>> {
    let item_key = validate_item_key(&item_key)?;
    let current = state
        .db
        .get_review_state(auth.device_id, &item_key)
        .await?
        .map(|s| s.to_core_state());

    let status = state
        .scheduler
        .describe_status(current.as_ref(), state.clock.now());

    Ok(Json(ItemStatusResponse { item_key, status }))
}

/// GET /api/study/history/:item_key
/// Review log for one item, oldest first
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Path(item_key): Path<String>,
) -> Result<Json<Vec<DbReview>>> {
    let item_key = validate_item_key(&item_key)?;
    let reviews = state
        .db
        .get_reviews_for_item(auth.device_id, &item_key)
        .await?;

    Ok(Json(reviews))
}

/// POST /api/study/queue
/// Order candidate items for study: new first, then most overdue, then hardest
pub async fn queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Json(payload): Json<StudyQueueRequest>,
) -> Result<Json<StudyQueueResponse>> {
    let keys = validate_queue_items(&payload.items)?;
    let rows = state.db.get_review_states(auth.device_id, &keys).await?;
    let states = states_by_key(rows);

    let (items, available) = build_queue(
        &state.scheduler,
        keys,
        &states,
        payload.only_due,
        payload.limit,
        state.clock.now(),
    );

    Ok(Json(StudyQueueResponse { items, available }))
}
