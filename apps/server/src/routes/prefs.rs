//! # Viewer Preference Routes
//!
//! Liked and hidden marks. Private to the acting viewer; no authorization
//! beyond a valid phone is needed because a mark only changes that viewer's
//! own feed.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use baraholka_core::{normalize_phone, validation, CoreError};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PrefRequest {
    pub phone: String,
    pub item_id: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
}

/// `POST /api/prefs/like` - flips the mark and reports the new state.
pub async fn toggle_like(
    State(state): State<AppState>,
    Json(req): Json<PrefRequest>,
) -> ApiResult<Json<LikeResponse>> {
    let phone = normalized(&req)?;
    let liked = state.db().prefs().toggle_like(&phone, &req.item_id).await?;
    Ok(Json(LikeResponse { liked }))
}

/// `POST /api/prefs/hide` - idempotent.
pub async fn hide_item(
    State(state): State<AppState>,
    Json(req): Json<PrefRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let phone = normalized(&req)?;
    state.db().prefs().hide(&phone, &req.item_id).await?;
    Ok(Json(StatusResponse { ok: true }))
}

/// `POST /api/prefs/unhide` - idempotent.
pub async fn unhide_item(
    State(state): State<AppState>,
    Json(req): Json<PrefRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let phone = normalized(&req)?;
    state.db().prefs().unhide(&phone, &req.item_id).await?;
    Ok(Json(StatusResponse { ok: true }))
}

fn normalized(req: &PrefRequest) -> Result<String, crate::error::ApiError> {
    let phone = normalize_phone(&req.phone);
    validation::validate_normalized_phone(&phone).map_err(CoreError::from)?;
    Ok(phone)
}
