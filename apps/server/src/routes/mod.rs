//! # HTTP Routes
//!
//! The command boundary of the marketplace.
//!
//! ## Route Map
//! ```text
//! POST   /api/register                          create account
//! POST   /api/login                             credential check
//! PUT    /api/users/{id}                        update profile
//! DELETE /api/users/{id}                        remove account + listings
//!
//! GET    /api/items                             filtered feed for a viewer
//! POST   /api/items                             create listing
//! PUT    /api/items/{id}                        edit listing (owner only)
//! DELETE /api/items/{id}                        remove listing (owner only)
//! POST   /api/items/{id}/book                   claim booking (atomic)
//! POST   /api/items/{id}/cancel                 release booking
//!
//! GET    /api/categories                        registry snapshot
//! POST   /api/categories                        create category
//! POST   /api/categories/{name}/subcategories   append subcategory
//!
//! POST   /api/prefs/like                        toggle liked mark
//! POST   /api/prefs/hide                        hide from own feed
//! POST   /api/prefs/unhide                      restore to own feed
//!
//! GET    /api/geocode?q=                        address suggestions
//! ```
//!
//! ## Identity
//! Requests carry the acting user's phone in the payload (or `viewer` query
//! parameter for the feed). Handlers normalize it first; every comparison
//! downstream uses the canonical digits.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod geocode;
pub mod items;
pub mod prefs;
pub mod users;

/// Builds the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/users/{id}", put(users::update_user))
        .route("/api/users/{id}", delete(users::delete_user))
        .route("/api/items", get(items::list_items))
        .route("/api/items", post(items::create_item))
        .route("/api/items/{id}", put(items::update_item))
        .route("/api/items/{id}", delete(items::delete_item))
        .route("/api/items/{id}/book", post(items::book_item))
        .route("/api/items/{id}/cancel", post(items::cancel_booking))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories", post(categories::add_category))
        .route(
            "/api/categories/{name}/subcategories",
            post(categories::add_subcategory),
        )
        .route("/api/prefs/like", post(prefs::toggle_like))
        .route("/api/prefs/hide", post(prefs::hide_item))
        .route("/api/prefs/unhide", post(prefs::unhide_item))
        .route("/api/geocode", get(geocode::geocode))
}
