//! Statistics endpoint

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::ProgressStats;
use crate::routes::auth::AuthenticatedDevice;
use crate::services::progress::states_by_key;
use crate::AppState;
use hsk_srs_core::Clock;

/// GET /api/stats
/// Summary over every item the device has reviewed
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedDevice>,
) -> Result<Json<ProgressStats>> {
    let rows = state.db.get_all_review_states(auth.device_id).await?;
    let states = states_by_key(rows);

    let stats = ProgressStats::summarize(
        states.keys(),
        |key| states.get(*key),
        state.clock.now(),
    );

    Ok(Json(stats))
}
