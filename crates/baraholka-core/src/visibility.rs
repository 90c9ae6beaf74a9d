//! # Listing Visibility Filter
//!
//! Decides which items a given viewer sees, and in what order.
//!
//! ## Narrowing Passes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                full item collection (newest first)                  │
//! │       │                                                             │
//! │       ▼  1. hidden suppression   (owner exempt)                     │
//! │       ▼  2. booking visibility   (booker and owner exempt)          │
//! │       ▼  3. my-items-only toggle                                    │
//! │       ▼  4. category exact match                                    │
//! │       ▼  5. age-marker intersection                                 │
//! │       ▼  6. distance threshold   (items w/o coords fail open)       │
//! │       │                                                             │
//! │       ▼            visible feed for this viewer                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Passes 1-2 change membership semantics (what the viewer is allowed to
//! see), so they run before the narrowing toggles. No pass reorders: the
//! baseline descending creation-time order is established once.

use std::collections::HashSet;

use crate::geo::haversine_meters;
use crate::types::{Coordinates, Item};

/// The viewer a feed is rendered for.
///
/// `phone` is the canonical viewer identity; `hidden` is the viewer's local
/// hidden-item set loaded from the preference store. Explicit on purpose:
/// there is no ambient current-user state anywhere in the engine.
#[derive(Debug, Clone, Default)]
pub struct ViewerContext {
    pub phone: String,
    pub hidden: HashSet<String>,
}

impl ViewerContext {
    pub fn new(phone: impl Into<String>) -> Self {
        ViewerContext {
            phone: phone.into(),
            hidden: HashSet::new(),
        }
    }

    pub fn with_hidden(mut self, hidden: HashSet<String>) -> Self {
        self.hidden = hidden;
        self
    }
}

/// Distance pass configuration: home point plus a kilometer threshold.
#[derive(Debug, Clone, Copy)]
pub struct DistanceFilter {
    pub home: Coordinates,
    pub max_km: f64,
}

/// Active filter predicates for one feed query.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Retain only the viewer's own items.
    pub only_mine: bool,
    /// Exact category match, when set.
    pub category: Option<String>,
    /// Age-marker selection; empty means the age pass is inactive.
    pub ages: Vec<String>,
    /// Distance threshold from the viewer's home, when enabled.
    pub distance: Option<DistanceFilter>,
}

/// Produces the ordered visible subset of `items` for `viewer`.
///
/// Ordering is descending creation time (ties broken by id for
/// determinism); every pass only removes items.
pub fn visible_items(
    mut items: Vec<Item>,
    viewer: &ViewerContext,
    filters: &FilterConfig,
) -> Vec<Item> {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    items.retain(|item| is_visible(item, viewer) && matches_filters(item, viewer, filters));
    items
}

/// Membership passes: may this viewer see the item at all?
///
/// - Hidden suppression: hidden items disappear from the viewer's feed,
///   unless the viewer owns them (owners always see their own items).
/// - Booking visibility: an item booked by X stays visible to X and to the
///   owner, and disappears for everyone else.
fn is_visible(item: &Item, viewer: &ViewerContext) -> bool {
    let is_owner = item.is_owned_by(&viewer.phone);

    if viewer.hidden.contains(&item.id) && !is_owner {
        return false;
    }

    if let Some(booker) = item.booked_by.as_deref() {
        if booker != viewer.phone && !is_owner {
            return false;
        }
    }

    true
}

/// Narrowing passes: ownership toggle, category, age markers, distance.
fn matches_filters(item: &Item, viewer: &ViewerContext, filters: &FilterConfig) -> bool {
    if filters.only_mine && !item.is_owned_by(&viewer.phone) {
        return false;
    }

    if let Some(category) = filters.category.as_deref() {
        if item.category != category {
            return false;
        }
    }

    if !filters.ages.is_empty() {
        // Items without markers never match an active age selection
        let intersects = item
            .age_markers
            .iter()
            .any(|marker| filters.ages.iter().any(|age| age == marker));
        if !intersects {
            return false;
        }
    }

    if let Some(distance) = filters.distance {
        // Unknown location is not treated as out-of-range
        if let Some(coords) = item.coords {
            let max_meters = distance.max_km * 1_000.0;
            if haversine_meters(distance.home, coords) > max_meters {
                return false;
            }
        }
    }

    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const OWNER: &str = "79991234567";
    const BOOKER: &str = "79123456789";
    const STRANGER: &str = "79990000001";

    struct ItemSpec {
        id: &'static str,
        owner: &'static str,
        booked_by: Option<&'static str>,
        category: &'static str,
        ages: &'static [&'static str],
        coords: Option<Coordinates>,
        age_offset_secs: i64,
    }

    impl Default for ItemSpec {
        fn default() -> Self {
            ItemSpec {
                id: "i1",
                owner: OWNER,
                booked_by: None,
                category: "Игрушки",
                ages: &[],
                coords: None,
                age_offset_secs: 0,
            }
        }
    }

    fn item(spec: ItemSpec) -> Item {
        Item {
            id: spec.id.to_string(),
            title: format!("Объявление {}", spec.id),
            description: String::new(),
            category: spec.category.to_string(),
            subcategory: None,
            location: String::new(),
            coords: spec.coords,
            price: None,
            bank: None,
            age_markers: spec.ages.iter().map(|s| (*s).to_string()).collect(),
            attachments: Vec::new(),
            user_phone: spec.owner.to_string(),
            booked_by: spec.booked_by.map(str::to_string),
            created_at: Utc::now() - Duration::seconds(spec.age_offset_secs),
        }
    }

    fn viewer(phone: &str) -> ViewerContext {
        ViewerContext::new(phone)
    }

    #[test]
    fn test_feed_is_newest_first() {
        let items = vec![
            item(ItemSpec {
                id: "old",
                age_offset_secs: 100,
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                id: "new",
                age_offset_secs: 0,
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                id: "mid",
                age_offset_secs: 50,
                ..ItemSpec::default()
            }),
        ];

        let feed = visible_items(items, &viewer(STRANGER), &FilterConfig::default());
        let ids: Vec<&str> = feed.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn test_hidden_is_per_viewer_and_owner_exempt() {
        let items = vec![item(ItemSpec::default())];

        // Viewer A hid the item: gone from A's feed
        let hidden: HashSet<String> = ["i1".to_string()].into();
        let a = viewer(STRANGER).with_hidden(hidden.clone());
        assert!(visible_items(items.clone(), &a, &FilterConfig::default()).is_empty());

        // Viewer B did not: still present
        let b = viewer(BOOKER);
        assert_eq!(visible_items(items.clone(), &b, &FilterConfig::default()).len(), 1);

        // The owner hid their own item: owners always see their items
        let owner = viewer(OWNER).with_hidden(hidden);
        assert_eq!(visible_items(items, &owner, &FilterConfig::default()).len(), 1);
    }

    #[test]
    fn test_booked_item_visible_only_to_booker_and_owner() {
        let items = vec![item(ItemSpec {
            booked_by: Some(BOOKER),
            ..ItemSpec::default()
        })];

        let filters = FilterConfig::default();
        assert_eq!(visible_items(items.clone(), &viewer(BOOKER), &filters).len(), 1);
        assert_eq!(visible_items(items.clone(), &viewer(OWNER), &filters).len(), 1);
        assert!(visible_items(items, &viewer(STRANGER), &filters).is_empty());
    }

    #[test]
    fn test_only_mine_toggle() {
        let items = vec![
            item(ItemSpec {
                id: "mine",
                owner: STRANGER,
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                id: "theirs",
                owner: OWNER,
                ..ItemSpec::default()
            }),
        ];

        let filters = FilterConfig {
            only_mine: true,
            ..FilterConfig::default()
        };
        let feed = visible_items(items, &viewer(STRANGER), &filters);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "mine");
    }

    #[test]
    fn test_category_exact_match() {
        let items = vec![
            item(ItemSpec {
                id: "toys",
                category: "Игрушки",
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                id: "books",
                category: "Учебники",
                ..ItemSpec::default()
            }),
        ];

        let filters = FilterConfig {
            category: Some("Учебники".to_string()),
            ..FilterConfig::default()
        };
        let feed = visible_items(items, &viewer(STRANGER), &filters);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "books");
    }

    #[test]
    fn test_age_filter_intersection() {
        let items = vec![item(ItemSpec {
            ages: &["0-1"],
            ..ItemSpec::default()
        })];

        let matching = FilterConfig {
            ages: vec!["0-1".to_string(), "3-5".to_string()],
            ..FilterConfig::default()
        };
        assert_eq!(visible_items(items.clone(), &viewer(STRANGER), &matching).len(), 1);

        let disjoint = FilterConfig {
            ages: vec!["6-10".to_string()],
            ..FilterConfig::default()
        };
        assert!(visible_items(items, &viewer(STRANGER), &disjoint).is_empty());
    }

    #[test]
    fn test_age_filter_drops_unmarked_items() {
        let items = vec![item(ItemSpec {
            ages: &[],
            ..ItemSpec::default()
        })];

        let filters = FilterConfig {
            ages: vec!["0-1".to_string()],
            ..FilterConfig::default()
        };
        assert!(visible_items(items, &viewer(STRANGER), &filters).is_empty());
    }

    #[test]
    fn test_distance_filter_with_fail_open_coords() {
        let home = Coordinates::new(55.7558, 37.6173);
        let items = vec![
            item(ItemSpec {
                id: "near",
                coords: Some(Coordinates::new(55.7600, 37.6200)),
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                id: "far",
                coords: Some(Coordinates::new(59.9343, 30.3351)),
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                id: "unknown",
                coords: None,
                ..ItemSpec::default()
            }),
        ];

        let filters = FilterConfig {
            distance: Some(DistanceFilter { home, max_km: 2.0 }),
            ..FilterConfig::default()
        };
        let feed = visible_items(items, &viewer(STRANGER), &filters);
        let ids: Vec<&str> = feed.iter().map(|i| i.id.as_str()).collect();
        // "far" is out of range; "unknown" has no coords and is never excluded
        assert!(ids.contains(&"near"));
        assert!(ids.contains(&"unknown"));
        assert!(!ids.contains(&"far"));
    }

    #[test]
    fn test_membership_passes_apply_before_only_mine() {
        // A stranger's booked item must not leak into an "only mine" feed
        // even though only_mine would already exclude it; and the owner's
        // own booked item must survive both passes.
        let items = vec![item(ItemSpec {
            id: "booked",
            owner: OWNER,
            booked_by: Some(BOOKER),
            ..ItemSpec::default()
        })];

        let filters = FilterConfig {
            only_mine: true,
            ..FilterConfig::default()
        };
        let feed = visible_items(items, &viewer(OWNER), &filters);
        assert_eq!(feed.len(), 1);
    }
}
