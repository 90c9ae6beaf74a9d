//! # Item Repository
//!
//! Database operations for listings, including the booking flag.
//!
//! ## Booking Exclusivity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                How Two Racing Bookers Are Resolved                      │
//! │                                                                         │
//! │  Viewer A ──┐                                                           │
//! │             │   UPDATE items SET booked_by = ?                          │
//! │             ├─► WHERE id = ? AND booked_by IS NULL                      │
//! │  Viewer B ──┘                                                           │
//! │                                                                         │
//! │  SQLite serializes writers: exactly ONE update matches the              │
//! │  `booked_by IS NULL` predicate. The other sees rows_affected = 0        │
//! │  and the caller reports a conflict.                                     │
//! │                                                                         │
//! │  No read-then-write window, no lost booking.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use baraholka_core::{Attachment, Coordinates, Item};

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw database row for an item.
///
/// `age_markers` and `attachments` are JSON payload columns (TEXT).
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    title: String,
    description: String,
    category: String,
    subcategory: Option<String>,
    location: String,
    lat: Option<f64>,
    lon: Option<f64>,
    price: Option<String>,
    bank: Option<String>,
    age_markers: String,
    attachments: String,
    user_phone: String,
    booked_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let age_markers: Vec<String> = serde_json::from_str(&row.age_markers)?;
        let attachments: Vec<Attachment> = serde_json::from_str(&row.attachments)?;

        // Coordinates are only meaningful as a pair
        let coords = match (row.lat, row.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };

        Ok(Item {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            location: row.location,
            coords,
            price: row.price,
            bank: row.bank,
            age_markers,
            attachments,
            user_phone: row.user_phone,
            booked_by: row.booked_by,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, description, category, subcategory,
           location, lat, lon, price, bank,
           age_markers, attachments, user_phone, booked_by, created_at
    FROM items
"#;

// =============================================================================
// Input Types
// =============================================================================

/// Fields for creating a listing. Id, timestamp and the (empty) booking
/// flag are generated here.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub location: String,
    pub coords: Option<Coordinates>,
    pub price: Option<String>,
    pub bank: Option<String>,
    /// Already normalized; never empty (see `normalize_age_markers`).
    pub age_markers: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Owner's canonical phone.
    pub user_phone: String,
}

/// Editable listing fields. The owner, booking flag and timestamp are
/// deliberately absent: edits never touch them.
#[derive(Debug, Clone)]
pub struct UpdateItem {
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub location: String,
    pub coords: Option<Coordinates>,
    pub price: Option<String>,
    pub bank: Option<String>,
    pub age_markers: Vec<String>,
    pub attachments: Vec<Attachment>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
/// let item = repo.insert(new_item).await?;
///
/// // Atomic booking attempt
/// if !repo.try_book(&item.id, "79123456789").await? {
///     // somebody else got there first
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists all items, newest first (ties broken by id for a stable feed).
    pub async fn list_all(&self) -> DbResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed items");
        rows.into_iter().map(Item::try_from).collect()
    }

    /// Gets an item by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Item::try_from).transpose()
    }

    /// Inserts a new listing.
    pub async fn insert(&self, new: NewItem) -> DbResult<Item> {
        debug!(title = %new.title, owner = %new.user_phone, "Inserting item");

        let item = Item {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            category: new.category,
            subcategory: new.subcategory,
            location: new.location,
            coords: new.coords,
            price: new.price,
            bank: new.bank,
            age_markers: new.age_markers,
            attachments: new.attachments,
            user_phone: new.user_phone,
            booked_by: None,
            created_at: Utc::now(),
        };

        let age_markers_json = serde_json::to_string(&item.age_markers)?;
        let attachments_json = serde_json::to_string(&item.attachments)?;

        sqlx::query(
            r#"
            INSERT INTO items (
                id, title, description, category, subcategory,
                location, lat, lon, price, bank,
                age_markers, attachments, user_phone, booked_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, NULL, ?14
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.subcategory)
        .bind(&item.location)
        .bind(item.coords.map(|c| c.lat))
        .bind(item.coords.map(|c| c.lon))
        .bind(&item.price)
        .bind(&item.bank)
        .bind(&age_markers_json)
        .bind(&attachments_json)
        .bind(&item.user_phone)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Updates a listing's editable fields.
    ///
    /// Owner, booking flag and creation time are untouched; authorization
    /// happens at the command boundary before this is called.
    pub async fn update(&self, id: &str, update: UpdateItem) -> DbResult<Item> {
        debug!(id = %id, "Updating item");

        let age_markers_json = serde_json::to_string(&update.age_markers)?;
        let attachments_json = serde_json::to_string(&update.attachments)?;

        let result = sqlx::query(
            r#"
            UPDATE items SET
                title = ?2,
                description = ?3,
                category = ?4,
                subcategory = ?5,
                location = ?6,
                lat = ?7,
                lon = ?8,
                price = ?9,
                bank = ?10,
                age_markers = ?11,
                attachments = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.category)
        .bind(&update.subcategory)
        .bind(&update.location)
        .bind(update.coords.map(|c| c.lat))
        .bind(update.coords.map(|c| c.lon))
        .bind(&update.price)
        .bind(&update.bank)
        .bind(&age_markers_json)
        .bind(&attachments_json)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Deletes a listing.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Deletes all listings owned by the given phone (account removal).
    ///
    /// ## Returns
    /// Number of listings removed.
    pub async fn delete_by_owner(&self, phone: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM items WHERE user_phone = ?1")
            .bind(phone)
            .execute(&self.pool)
            .await?;

        debug!(owner = %phone, count = result.rows_affected(), "Deleted owner's items");
        Ok(result.rows_affected())
    }

    /// Attempts to book an item for the given viewer, atomically.
    ///
    /// The conditional update only matches when the item is currently
    /// available, so concurrent attempts can never both succeed.
    ///
    /// ## Returns
    /// * `Ok(true)` - The viewer now holds the booking
    /// * `Ok(false)` - Item exists but is already booked
    /// * `Err(DbError::NotFound)` - No such item
    pub async fn try_book(&self, id: &str, viewer_phone: &str) -> DbResult<bool> {
        debug!(id = %id, viewer = %viewer_phone, "Attempting booking");

        let result = sqlx::query(
            r#"
            UPDATE items SET booked_by = ?2
            WHERE id = ?1 AND booked_by IS NULL
            "#,
        )
        .bind(id)
        .bind(viewer_phone)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish "already booked" from "no such item"
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists == 0 {
            Err(DbError::not_found("Item", id))
        } else {
            Ok(false)
        }
    }

    /// Clears the booking flag, returning the item to the feed.
    ///
    /// Idempotent: clearing an already-available item is a no-op.
    pub async fn cancel_booking(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Clearing booking");

        let result = sqlx::query("UPDATE items SET booked_by = NULL WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        // SQLite counts no-change updates as affected, so zero rows means
        // the id didn't match anything
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Counts listings (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use baraholka_core::{MediaKind, ANY_AGE_MARKER};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_item(owner: &str) -> NewItem {
        NewItem {
            title: "Детская коляска".to_string(),
            description: "Почти новая".to_string(),
            category: "Коляски".to_string(),
            subcategory: Some("Детские".to_string()),
            location: "Москва".to_string(),
            coords: Some(Coordinates::new(55.7558, 37.6173)),
            price: Some("Бесплатно".to_string()),
            bank: None,
            age_markers: vec!["0-1".to_string()],
            attachments: vec![Attachment {
                kind: MediaKind::Image,
                data: "data:image/png;base64,AAAA".to_string(),
            }],
            user_phone: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_round_trip() {
        let db = test_db().await;
        let repo = db.items();

        let item = repo.insert(sample_item("79991234567")).await.unwrap();
        let found = repo.get_by_id(&item.id).await.unwrap().unwrap();

        assert_eq!(found.title, "Детская коляска");
        assert_eq!(found.coords.unwrap().lat, 55.7558);
        assert_eq!(found.age_markers, vec!["0-1"]);
        assert_eq!(found.attachments.len(), 1);
        assert!(found.booked_by.is_none());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let db = test_db().await;
        let repo = db.items();

        let first = repo.insert(sample_item("79991234567")).await.unwrap();
        let second = repo.insert(sample_item("79991234567")).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        // Equal timestamps fall back to id ordering; either way the later
        // insert must not sort after the earlier one
        let pos_first = all.iter().position(|i| i.id == first.id).unwrap();
        let pos_second = all.iter().position(|i| i.id == second.id).unwrap();
        assert!(all[0].created_at >= all[1].created_at);
        assert_ne!(pos_first, pos_second);
    }

    #[tokio::test]
    async fn test_try_book_once_then_conflict() {
        let db = test_db().await;
        let repo = db.items();

        let item = repo.insert(sample_item("79991234567")).await.unwrap();

        assert!(repo.try_book(&item.id, "79123456789").await.unwrap());
        // Second attempt finds booked_by set and fails
        assert!(!repo.try_book(&item.id, "79000000000").await.unwrap());

        let found = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(found.booked_by.as_deref(), Some("79123456789"));
    }

    #[tokio::test]
    async fn test_try_book_missing_item_is_not_found() {
        let db = test_db().await;
        let err = db
            .items()
            .try_book("no-such-id", "79123456789")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancel_booking_roundtrip_and_idempotence() {
        let db = test_db().await;
        let repo = db.items();

        let item = repo.insert(sample_item("79991234567")).await.unwrap();
        repo.try_book(&item.id, "79123456789").await.unwrap();

        repo.cancel_booking(&item.id).await.unwrap();
        let found = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert!(found.booked_by.is_none());

        // Cancelling again is a no-op, and the item can be booked anew
        repo.cancel_booking(&item.id).await.unwrap();
        assert!(repo.try_book(&item.id, "79000000000").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_preserves_booking_and_owner() {
        let db = test_db().await;
        let repo = db.items();

        let item = repo.insert(sample_item("79991234567")).await.unwrap();
        repo.try_book(&item.id, "79123456789").await.unwrap();

        let updated = repo
            .update(
                &item.id,
                UpdateItem {
                    title: "Коляска (обновлено)".to_string(),
                    description: item.description.clone(),
                    category: item.category.clone(),
                    subcategory: item.subcategory.clone(),
                    location: item.location.clone(),
                    coords: None,
                    price: item.price.clone(),
                    bank: None,
                    age_markers: vec![ANY_AGE_MARKER.to_string()],
                    attachments: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Коляска (обновлено)");
        assert_eq!(updated.user_phone, "79991234567");
        assert_eq!(updated.booked_by.as_deref(), Some("79123456789"));
        assert!(updated.coords.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_owner_only_removes_theirs() {
        let db = test_db().await;
        let repo = db.items();

        repo.insert(sample_item("79991234567")).await.unwrap();
        repo.insert(sample_item("79991234567")).await.unwrap();
        let other = repo.insert(sample_item("79000000000")).await.unwrap();

        let removed = repo.delete_by_owner("79991234567").await.unwrap();
        assert_eq!(removed, 2);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, other.id);
    }
}
