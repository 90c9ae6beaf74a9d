//! # Geocode Route
//!
//! Thin proxy over the keyed upstream geocoder. Degrades to an empty list
//! on any upstream trouble; clients treat an empty answer as "no
//! suggestions", never as an error.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::geocode::GeocodeMatch;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/geocode?q=`
pub async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Json<Vec<GeocodeMatch>> {
    Json(state.geocoder().search(&query.q).await)
}
