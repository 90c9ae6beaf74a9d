//! # User Profile Routes
//!
//! Profile update and account removal. The phone is identity and never
//! changes; a profile update that touches the address also drops the cached
//! home coordinates so the distance filter re-resolves.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use baraholka_core::{AddressDetails, CoreError};
use baraholka_db::UpdateUser;

use crate::error::ApiResult;
use crate::routes::auth::UserResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_details: Option<AddressDetails>,
    #[serde(default)]
    pub availability: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub ok: bool,
    /// Listings removed along with the account.
    pub items_removed: u64,
}

/// `PUT /api/users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let address_changed = req.address.is_some() || req.address_details.is_some();

    let user = state
        .db()
        .users()
        .update(
            &id,
            UpdateUser {
                name: req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
                password: req.password,
                address: req.address,
                address_details: req.address_details,
                availability: req.availability,
            },
        )
        .await?;

    if address_changed {
        state.invalidate_home(&user.phone).await;
    }

    info!(id = %user.id, "Profile updated");
    Ok(Json(user.into()))
}

/// `DELETE /api/users/{id}`
///
/// Removes the account, all of its listings, and the viewer's marks. The
/// deletions are ordered so that a failure partway leaves no orphaned
/// listings pointing at a removed account.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let user = state
        .db()
        .users()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(id.clone()))?;

    // Other viewers' marks on the listings go first, while the items exist
    state.db().prefs().remove_for_owned_items(&user.phone).await?;
    let items_removed = state.db().items().delete_by_owner(&user.phone).await?;
    state.db().prefs().remove_for_viewer(&user.phone).await?;
    state.db().users().delete(&id).await?;
    state.invalidate_home(&user.phone).await;

    info!(id = %id, items_removed, "Account removed");
    Ok(Json(DeleteUserResponse {
        ok: true,
        items_removed,
    }))
}
