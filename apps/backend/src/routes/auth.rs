//! Device token authentication middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Authenticated device info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedDevice {
    pub device_id: Uuid,
    pub token: String,
}

/// Pull the bearer token out of the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))
}

/// Resolve the device behind the bearer token and attach it to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())?.to_string();

    let device = state
        .db
        .get_device_by_token(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid device token".to_string()))?;

    state.db.update_last_seen(device.id).await?;

    request.extensions_mut().insert(AuthenticatedDevice {
        device_id: device.id,
        token,
    });

    Ok(next.run(request).await)
}
