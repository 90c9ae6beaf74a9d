//! # baraholka-core: Pure Business Logic for Baraholka
//!
//! This crate is the heart of the marketplace. It contains the listing
//! visibility and booking-state engine as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Baraholka Architecture                          │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                  HTTP API (apps/server)                     │   │
//! │  │    register, login, items feed, book, cancel, categories    │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │             ★ baraholka-core (THIS CRATE) ★                 │   │
//! │  │                                                             │   │
//! │  │  ┌──────────┐ ┌────────────┐ ┌─────────┐ ┌──────────────┐  │   │
//! │  │  │  phone   │ │ visibility │ │ booking │ │   catalog    │  │   │
//! │  │  │normalize │ │   passes   │ │  rules  │ │   registry   │  │   │
//! │  │  └──────────┘ └────────────┘ └─────────┘ └──────────────┘  │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │   │
//! │  └────────────────────────────┬────────────────────────────────┘   │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐   │
//! │  │                baraholka-db (Database Layer)                │   │
//! │  │           SQLite queries, migrations, repositories          │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Item, Attachment, Coordinates)
//! - [`phone`] - Canonical phone normalization
//! - [`booking`] - Booking state machine and authorization rules
//! - [`visibility`] - Listing visibility filter (ordered narrowing passes)
//! - [`catalog`] - Category registry with uniqueness guards
//! - [`geo`] - Great-circle distance for the distance filter
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: every function is deterministic
//! 2. **No ambient state**: viewer identity and filter configuration are
//!    explicit parameters, never globals
//! 3. **Explicit errors**: all errors are typed, never strings or panics

pub mod booking;
pub mod catalog;
pub mod error;
pub mod geo;
pub mod phone;
pub mod types;
pub mod validation;
pub mod visibility;

pub use booking::{authorize_book, authorize_cancel, booking_state, BookingState, CancelOutcome};
pub use catalog::{default_categories, Category, CategoryRegistry};
pub use error::{CoreError, CoreResult, ValidationError};
pub use geo::{haversine_meters, EARTH_RADIUS_METERS};
pub use phone::normalize_phone;
pub use types::*;
pub use visibility::{visible_items, DistanceFilter, FilterConfig, ViewerContext};

/// Sentinel age marker applied when a seller picks no age range.
///
/// Items always carry a non-empty age-marker set; the sentinel keeps "no
/// preference" items matchable as a distinct tag rather than an absent one.
pub const ANY_AGE_MARKER: &str = "на любой возраст";

/// Maximum media attachments per item.
pub const MAX_ATTACHMENTS: usize = 5;
