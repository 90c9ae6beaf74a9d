//! # Domain Types
//!
//! Core domain types used throughout Baraholka.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐    │
//! │  │     User        │   │      Item       │   │   Attachment    │    │
//! │  │  ────────────   │   │  ────────────   │   │  ────────────   │    │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  kind           │    │
//! │  │  phone (unique) │   │  user_phone     │   │  data (data URL)│    │
//! │  │  availability   │   │  booked_by      │   └─────────────────┘    │
//! │  └─────────────────┘   │  age_markers    │                          │
//! │                        │  coords         │   ┌─────────────────┐    │
//! │  ┌─────────────────┐   └─────────────────┘   │  Coordinates    │    │
//! │  │ AddressDetails  │                         │  lat / lon (°)  │    │
//! │  └─────────────────┘                         └─────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Users and items carry opaque UUID ids, but **ownership is by phone**:
//! an item belongs to whoever holds its `user_phone` in canonical form.
//! All phone comparisons in this crate assume canonical digits (see
//! [`crate::phone::normalize_phone`]).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Coordinates
// =============================================================================

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coordinates { lat, lon }
    }
}

// =============================================================================
// Attachments
// =============================================================================

/// Media kind of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A media blob attached to an item.
///
/// The payload is an opaque data URL produced by the client; this crate
/// never inspects it beyond the declared kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: MediaKind,
    pub data: String,
}

// =============================================================================
// User
// =============================================================================

/// Optional structured address sub-fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Canonical phone digits. Unique across users; the user's seller
    /// identity on items.
    pub phone: String,

    /// Display name.
    pub name: String,

    /// Plain-text credential. Hashing is deliberately absent here.
    pub password: String,

    /// Free-text home address; geocoded on demand for the distance filter.
    pub address: Option<String>,

    /// Structured address sub-fields.
    pub address_details: Option<AddressDetails>,

    /// Weekday name → free-text pickup time window.
    pub availability: BTreeMap<String, String>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks whether this user owns the given item (phone match).
    #[inline]
    pub fn owns(&self, item: &Item) -> bool {
        item.user_phone == self.phone
    }
}

// =============================================================================
// Item
// =============================================================================

/// A classified listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub title: String,
    pub description: String,

    /// Category name; must exist in the registry.
    pub category: String,

    /// Optional subcategory; must belong to the category's list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    /// Free-text pickup location.
    pub location: String,

    /// Resolved coordinates of `location`, when geocoding succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coordinates>,

    /// Free-text price note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    /// Free-text payment note (bank).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,

    /// Age-range tags. Never empty: defaults to the "any age" sentinel.
    pub age_markers: Vec<String>,

    /// Up to [`crate::MAX_ATTACHMENTS`] media blobs, in upload order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Owner's canonical phone. Immutable seller identity.
    pub user_phone: String,

    /// Canonical phone of the current booker, or None when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_by: Option<String>,

    /// Creation time; the feed orders by this, newest first.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Checks ownership against a canonical phone.
    #[inline]
    pub fn is_owned_by(&self, phone: &str) -> bool {
        self.user_phone == phone
    }

    /// Checks whether the given canonical phone currently holds the booking.
    #[inline]
    pub fn is_booked_by(&self, phone: &str) -> bool {
        self.booked_by.as_deref() == Some(phone)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(owner: &str, booked_by: Option<&str>) -> Item {
        Item {
            id: "i1".to_string(),
            title: "Коляска".to_string(),
            description: String::new(),
            category: "Коляски".to_string(),
            subcategory: None,
            location: String::new(),
            coords: None,
            price: None,
            bank: None,
            age_markers: vec![crate::ANY_AGE_MARKER.to_string()],
            attachments: Vec::new(),
            user_phone: owner.to_string(),
            booked_by: booked_by.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ownership_is_by_phone() {
        let it = item("79991234567", None);
        assert!(it.is_owned_by("79991234567"));
        assert!(!it.is_owned_by("79990000000"));
    }

    #[test]
    fn test_booked_by_check() {
        let it = item("79991234567", Some("79123456789"));
        assert!(it.is_booked_by("79123456789"));
        assert!(!it.is_booked_by("79991234567"));

        let free = item("79991234567", None);
        assert!(!free.is_booked_by("79123456789"));
    }

    #[test]
    fn test_attachment_kind_serializes_lowercase() {
        let att = Attachment {
            kind: MediaKind::Image,
            data: "data:image/png;base64,AAAA".to_string(),
        };
        let json = serde_json::to_value(&att).unwrap();
        assert_eq!(json["kind"], "image");
    }
}
