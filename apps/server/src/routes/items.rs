//! # Item Routes
//!
//! The feed, listing CRUD, and the booking pair.
//!
//! ## Handler Shape
//! Every handler follows the same three steps:
//! 1. normalize the requester's phone
//! 2. authorize + validate against a snapshot (baraholka-core rules)
//! 3. persist through a repository (atomic where it matters)

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use baraholka_core::{
    authorize_book, authorize_cancel, normalize_phone, validation, visible_items, Attachment,
    CancelOutcome, CoreError, DistanceFilter, FilterConfig, Item, ViewerContext,
};
use baraholka_db::{NewItem, UpdateItem as UpdateItemFields};

use crate::error::ApiResult;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// Feed query parameters. All optional; an anonymous viewer gets the
/// unfiltered public feed.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Viewer's phone (any format).
    pub viewer: Option<String>,
    /// Restrict to the viewer's own listings.
    #[serde(default)]
    pub mine: Option<bool>,
    pub category: Option<String>,
    /// Comma-separated age markers.
    pub ages: Option<String>,
    /// Distance threshold from the viewer's home address, in kilometers.
    pub distance_km: Option<f64>,
}

/// Feed entry: the item plus the viewer's liked mark.
#[derive(Debug, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub item: Item,
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Seller's phone (any format).
    pub phone: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub location: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub age_markers: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// Requester's phone; must be the owner.
    pub phone: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub location: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub age_markers: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Requester identity for delete / book / cancel.
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
}

// =============================================================================
// Feed
// =============================================================================

/// `GET /api/items`
///
/// Runs the visibility passes for the requesting viewer. Distance filtering
/// needs a resolvable home address; when the viewer has none the distance
/// pass is skipped entirely (fail open).
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<Vec<FeedItem>>> {
    let viewer_phone = query
        .viewer
        .as_deref()
        .map(normalize_phone)
        .unwrap_or_default();

    let prefs = if viewer_phone.is_empty() {
        baraholka_db::ViewerPrefs::default()
    } else {
        state.db().prefs().load_for(&viewer_phone).await?
    };

    let viewer = ViewerContext::new(viewer_phone.clone()).with_hidden(prefs.hidden);

    let distance = match query.distance_km {
        Some(max_km) if !viewer_phone.is_empty() => state
            .home_coords(&viewer_phone)
            .await
            .map(|home| DistanceFilter { home, max_km }),
        _ => None,
    };

    let filters = FilterConfig {
        only_mine: query.mine.unwrap_or(false),
        category: query.category,
        ages: query
            .ages
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        distance,
    };

    let items = state.db().items().list_all().await?;
    let feed = visible_items(items, &viewer, &filters)
        .into_iter()
        .map(|item| {
            let liked = prefs.liked.contains(&item.id);
            FeedItem { item, liked }
        })
        .collect();

    Ok(Json(feed))
}

// =============================================================================
// CRUD
// =============================================================================

/// `POST /api/items`
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<Json<Item>> {
    let phone = normalize_phone(&req.phone);
    let fields = validate_item_fields(&state, ItemFields::from_create(&req)).await?;
    validation::validate_normalized_phone(&phone).map_err(CoreError::from)?;

    // Best effort: a listing with an unresolvable address still goes up,
    // it just won't participate in distance filtering
    let coords = state.geocoder().resolve(&fields.location).await;

    let item = state
        .db()
        .items()
        .insert(NewItem {
            title: fields.title,
            description: fields.description,
            category: fields.category,
            subcategory: fields.subcategory,
            location: fields.location,
            coords,
            price: fields.price,
            bank: fields.bank,
            age_markers: fields.age_markers,
            attachments: fields.attachments,
            user_phone: phone,
        })
        .await?;

    info!(id = %item.id, owner = %item.user_phone, "Created item");
    Ok(Json(item))
}

/// `PUT /api/items/{id}` (owner only)
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<Item>> {
    let phone = normalize_phone(&req.phone);
    let existing = fetch_item(&state, &id).await?;

    if !existing.is_owned_by(&phone) {
        return Err(CoreError::NotOwner { item_id: id }.into());
    }

    let fields = validate_item_fields(&state, ItemFields::from_update(&req)).await?;

    let coords = if fields.location == existing.location {
        existing.coords
    } else {
        state.geocoder().resolve(&fields.location).await
    };

    let item = state
        .db()
        .items()
        .update(
            &id,
            UpdateItemFields {
                title: fields.title,
                description: fields.description,
                category: fields.category,
                subcategory: fields.subcategory,
                location: fields.location,
                coords,
                price: fields.price,
                bank: fields.bank,
                age_markers: fields.age_markers,
                attachments: fields.attachments,
            },
        )
        .await?;

    info!(id = %item.id, "Updated item");
    Ok(Json(item))
}

/// `DELETE /api/items/{id}` (owner only)
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let phone = normalize_phone(&req.phone);
    let existing = fetch_item(&state, &id).await?;

    if !existing.is_owned_by(&phone) {
        return Err(CoreError::NotOwner { item_id: id }.into());
    }

    state.db().items().delete(&id).await?;
    // Dangling liked/hidden marks would never resolve to an item again
    state.db().prefs().remove_for_item(&id).await?;

    info!(id = %id, "Deleted item");
    Ok(Json(StatusResponse { ok: true }))
}

// =============================================================================
// Booking
// =============================================================================

/// `POST /api/items/{id}/book`
///
/// The snapshot check gives precise errors (own item, already booked); the
/// conditional update makes the claim atomic. A racer who slips between the
/// two still gets a clean conflict from the update.
pub async fn book_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<Json<Item>> {
    let phone = normalize_phone(&req.phone);
    // An input with no digits normalizes to "" and would otherwise pass the
    // snapshot checks and land an empty booker in storage
    validation::validate_normalized_phone(&phone).map_err(CoreError::from)?;
    let item = fetch_item(&state, &id).await?;

    authorize_book(&item, &phone)?;

    let claimed = state.db().items().try_book(&id, &phone).await?;
    if !claimed {
        return Err(CoreError::AlreadyBooked { item_id: id }.into());
    }

    info!(id = %id, booker = %phone, "Item booked");
    let item = fetch_item(&state, &id).await?;
    Ok(Json(item))
}

/// `POST /api/items/{id}/cancel`
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> ApiResult<Json<Item>> {
    let phone = normalize_phone(&req.phone);
    validation::validate_normalized_phone(&phone).map_err(CoreError::from)?;
    let item = fetch_item(&state, &id).await?;

    match authorize_cancel(&item, &phone)? {
        CancelOutcome::NoOp => Ok(Json(item)),
        CancelOutcome::ClearBooking => {
            state.db().items().cancel_booking(&id).await?;
            info!(id = %id, by = %phone, "Booking cancelled");
            let item = fetch_item(&state, &id).await?;
            Ok(Json(item))
        }
    }
}

// =============================================================================
// Shared Validation
// =============================================================================

/// Listing fields common to create and update, after normalization.
struct ItemFields {
    title: String,
    description: String,
    category: String,
    subcategory: Option<String>,
    location: String,
    price: Option<String>,
    bank: Option<String>,
    age_markers: Vec<String>,
    attachments: Vec<Attachment>,
}

impl ItemFields {
    fn from_create(req: &CreateItemRequest) -> Self {
        ItemFields {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            category: req.category.trim().to_string(),
            subcategory: req.subcategory.clone(),
            location: req.location.trim().to_string(),
            price: req.price.clone(),
            bank: req.bank.clone(),
            age_markers: req.age_markers.clone(),
            attachments: req.attachments.clone(),
        }
    }

    fn from_update(req: &UpdateItemRequest) -> Self {
        ItemFields {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            category: req.category.trim().to_string(),
            subcategory: req.subcategory.clone(),
            location: req.location.trim().to_string(),
            price: req.price.clone(),
            bank: req.bank.clone(),
            age_markers: req.age_markers.clone(),
            attachments: req.attachments.clone(),
        }
    }
}

/// Applies the listing validation rules and registry checks.
async fn validate_item_fields(state: &AppState, mut fields: ItemFields) -> ApiResult<ItemFields> {
    validation::validate_title(&fields.title).map_err(CoreError::from)?;
    validation::validate_required("category", &fields.category).map_err(CoreError::from)?;
    validation::validate_required("location", &fields.location).map_err(CoreError::from)?;
    validation::validate_attachments(&fields.attachments).map_err(CoreError::from)?;

    let registry = state.db().categories().load().await?;
    registry
        .validate_subcategory(&fields.category, fields.subcategory.as_deref())
        .map_err(CoreError::from)?;

    fields.age_markers = validation::normalize_age_markers(std::mem::take(&mut fields.age_markers));
    fields.subcategory = fields
        .subcategory
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(fields)
}

async fn fetch_item(state: &AppState, id: &str) -> ApiResult<Item> {
    state
        .db()
        .items()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()).into())
}

// =============================================================================
// Unit Tests
// =============================================================================
