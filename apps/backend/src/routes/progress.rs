//! Progress blob endpoints (download, upload with merge, bulk reset)

use axum::{extract::State, Extension, Json};

use crate::db::Database;
use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::progress::{decode_upload, snapshot_from_rows};
use crate::AppState;

/// GET /api/progress
/// Every stored review state, keyed by item
pub async fn download(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<ProgressSnapshot>> {
    let rows = state.db.get_all_review_states(auth.device_id).await?;
    Ok(Json(snapshot_from_rows(rows)))
}

/// PUT /api/progress
/// Merge a progress blob from a client; newer reviews win per item
pub async fn upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UploadProgressResponse>> {
    let decoded = decode_upload(body);

    let mut tx = state.db.begin().await?;
    let mut merged = 0;
    for (item_key, review_state) in decoded.snapshot {
        let row = DbReviewState::from_core_state(auth.device_id, &item_key, &review_state);
        if Database::merge_review_state(&mut *tx, &row).await? {
            merged += 1;
        }
    }
    tx.commit().await?;

    let total = state.db.count_review_states(auth.device_id).await?;
    tracing::info!(
        "Merged {} progress entries for device {} ({} stored)",
        merged,
        auth.device_id,
        total
    );

    Ok(Json(UploadProgressResponse {
        merged,
        dropped: decoded.dropped,
        total: usize::try_from(total).unwrap_or_default(),
    }))
}

/// DELETE /api/progress
/// Forget all progress for the device
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<ResetProgressResponse>> {
    let deleted = state.db.delete_all_review_states(auth.device_id).await?;
    tracing::info!("Reset progress for device {} ({} states)", auth.device_id, deleted);

    Ok(Json(ResetProgressResponse { deleted }))
}
