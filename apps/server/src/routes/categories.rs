//! # Category Routes
//!
//! Registry reads and the two growth operations. Name uniqueness is
//! enforced by the registry itself inside a transaction; these handlers
//! only pre-check that names are present.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use baraholka_core::{validation, Category, CoreError};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddSubcategoryRequest {
    pub name: String,
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let registry = state.db().categories().load().await?;
    Ok(Json(registry.categories().to_vec()))
}

/// `POST /api/categories`
pub async fn add_category(
    State(state): State<AppState>,
    Json(req): Json<AddCategoryRequest>,
) -> ApiResult<Json<Category>> {
    validation::validate_required("category name", &req.name).map_err(CoreError::from)?;

    let category = state
        .db()
        .categories()
        .add_category(&req.name, req.subcategories)
        .await?;

    info!(name = %category.name, "Category created");
    Ok(Json(category))
}

/// `POST /api/categories/{name}/subcategories`
pub async fn add_subcategory(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(req): Json<AddSubcategoryRequest>,
) -> ApiResult<Json<Category>> {
    validation::validate_required("subcategory name", &req.name).map_err(CoreError::from)?;

    let changed = state
        .db()
        .categories()
        .add_subcategory(&category, &req.name)
        .await?;

    info!(category = %category, name = %req.name, "Subcategory added");
    Ok(Json(changed))
}
