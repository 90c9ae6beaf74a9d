//! # Auth Routes
//!
//! Registration and login. Identity is the canonical phone: whatever
//! punctuation the client sends, the account is keyed by normalized digits,
//! so "8 (999) 123-45-67" and "+79991234567" are the same person.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use baraholka_core::{normalize_phone, validation, AddressDetails, CoreError, User};
use baraholka_db::NewUser;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_details: Option<AddressDetails>,
    #[serde(default)]
    pub availability: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Public view of a user; the stored credential never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub address: Option<String>,
    pub address_details: Option<AddressDetails>,
    pub availability: BTreeMap<String, String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            phone: user.phone,
            name: user.name,
            address: user.address,
            address_details: user.address_details,
            availability: user.availability,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    let phone = normalize_phone(&req.phone);
    validation::validate_normalized_phone(&phone).map_err(CoreError::from)?;
    validation::validate_required("name", &req.name).map_err(CoreError::from)?;
    validation::validate_required("password", &req.password).map_err(CoreError::from)?;

    let user = state
        .db()
        .users()
        .insert(NewUser {
            phone: phone.clone(),
            name: req.name.trim().to_string(),
            password: req.password,
            address: req.address,
            address_details: req.address_details,
            availability: req.availability,
        })
        .await
        .map_err(|e| match e {
            baraholka_db::DbError::UniqueViolation { .. } => {
                ApiError::from(CoreError::DuplicatePhone { phone: phone.clone() })
            }
            other => other.into(),
        })?;

    info!(phone = %user.phone, "Registered user");
    Ok(Json(user.into()))
}

/// `POST /api/login`
///
/// A wrong phone and a wrong password answer identically so the endpoint
/// doesn't reveal which phones have accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let phone = normalize_phone(&req.phone);

    let user = state
        .db()
        .users()
        .find_by_phone(&phone)
        .await?
        .filter(|u| u.password == req.password)
        .ok_or(CoreError::InvalidCredentials)?;

    info!(phone = %user.phone, "User logged in");
    Ok(Json(user.into()))
}
