//! # Viewer Preference Repository
//!
//! Per-viewer marks on listings: liked (favourites) and hidden.
//!
//! Marks are keyed by `(viewer_phone, item_id, kind)`. They are private to
//! the viewer: liking an item changes nothing for anyone else, and hiding
//! an item only suppresses it from that viewer's own feed (owners are
//! exempt, see the visibility rules in baraholka-core).

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Types
// =============================================================================

/// Kind of a viewer preference mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefKind {
    Liked,
    Hidden,
}

impl PrefKind {
    /// Storage representation, matching the table's CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            PrefKind::Liked => "liked",
            PrefKind::Hidden => "hidden",
        }
    }
}

/// A viewer's full preference state, loaded once per feed request.
#[derive(Debug, Clone, Default)]
pub struct ViewerPrefs {
    pub liked: HashSet<String>,
    pub hidden: HashSet<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for per-viewer preference marks.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.prefs();
/// let now_liked = repo.toggle_like("79991234567", &item_id).await?;
/// let prefs = repo.load_for("79991234567").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ViewerPrefsRepository {
    pool: SqlitePool,
}

impl ViewerPrefsRepository {
    /// Creates a new ViewerPrefsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ViewerPrefsRepository { pool }
    }

    /// Loads all marks for one viewer.
    pub async fn load_for(&self, viewer_phone: &str) -> DbResult<ViewerPrefs> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT item_id, kind FROM viewer_prefs WHERE viewer_phone = ?1",
        )
        .bind(viewer_phone)
        .fetch_all(&self.pool)
        .await?;

        let mut prefs = ViewerPrefs::default();
        for (item_id, kind) in rows {
            match kind.as_str() {
                "liked" => {
                    prefs.liked.insert(item_id);
                }
                "hidden" => {
                    prefs.hidden.insert(item_id);
                }
                // CHECK constraint makes this unreachable
                _ => {}
            }
        }
        Ok(prefs)
    }

    /// Toggles the liked mark on an item.
    ///
    /// ## Returns
    /// `true` when the item is liked after the call, `false` when unliked.
    pub async fn toggle_like(&self, viewer_phone: &str, item_id: &str) -> DbResult<bool> {
        let inserted = self.set_mark(viewer_phone, item_id, PrefKind::Liked).await?;
        if inserted {
            debug!(viewer = %viewer_phone, item = %item_id, "Liked item");
            return Ok(true);
        }

        self.clear_mark(viewer_phone, item_id, PrefKind::Liked).await?;
        debug!(viewer = %viewer_phone, item = %item_id, "Unliked item");
        Ok(false)
    }

    /// Hides an item from the viewer's feed. Idempotent.
    pub async fn hide(&self, viewer_phone: &str, item_id: &str) -> DbResult<()> {
        self.set_mark(viewer_phone, item_id, PrefKind::Hidden).await?;
        debug!(viewer = %viewer_phone, item = %item_id, "Hid item");
        Ok(())
    }

    /// Removes the hidden mark. Idempotent.
    pub async fn unhide(&self, viewer_phone: &str, item_id: &str) -> DbResult<()> {
        self.clear_mark(viewer_phone, item_id, PrefKind::Hidden).await?;
        debug!(viewer = %viewer_phone, item = %item_id, "Unhid item");
        Ok(())
    }

    /// Drops all marks referencing an item (listing deletion cleanup).
    pub async fn remove_for_item(&self, item_id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM viewer_prefs WHERE item_id = ?1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drops all marks on items owned by the given phone.
    ///
    /// Account removal deletes the owner's listings in bulk; this clears
    /// every other viewer's liked/hidden rows on them first, so it must run
    /// while the items still exist.
    pub async fn remove_for_owned_items(&self, owner_phone: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            DELETE FROM viewer_prefs
            WHERE item_id IN (SELECT id FROM items WHERE user_phone = ?1)
            "#,
        )
        .bind(owner_phone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drops all marks made by a viewer (account removal cleanup).
    pub async fn remove_for_viewer(&self, viewer_phone: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM viewer_prefs WHERE viewer_phone = ?1")
            .bind(viewer_phone)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a mark; returns false when it was already present.
    async fn set_mark(
        &self,
        viewer_phone: &str,
        item_id: &str,
        kind: PrefKind,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO viewer_prefs (viewer_phone, item_id, kind, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(viewer_phone)
        .bind(item_id)
        .bind(kind.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_mark(
        &self,
        viewer_phone: &str,
        item_id: &str,
        kind: PrefKind,
    ) -> DbResult<()> {
        sqlx::query(
            "DELETE FROM viewer_prefs WHERE viewer_phone = ?1 AND item_id = ?2 AND kind = ?3",
        )
        .bind(viewer_phone)
        .bind(item_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_toggle_like_flips_state() {
        let db = test_db().await;
        let repo = db.prefs();

        assert!(repo.toggle_like("79991234567", "item-1").await.unwrap());
        assert!(!repo.toggle_like("79991234567", "item-1").await.unwrap());
        assert!(repo.toggle_like("79991234567", "item-1").await.unwrap());

        let prefs = repo.load_for("79991234567").await.unwrap();
        assert!(prefs.liked.contains("item-1"));
    }

    #[tokio::test]
    async fn test_hide_is_idempotent_and_private() {
        let db = test_db().await;
        let repo = db.prefs();

        repo.hide("79991234567", "item-1").await.unwrap();
        repo.hide("79991234567", "item-1").await.unwrap();

        let prefs = repo.load_for("79991234567").await.unwrap();
        assert!(prefs.hidden.contains("item-1"));

        // Another viewer is unaffected
        let other = repo.load_for("79000000000").await.unwrap();
        assert!(other.hidden.is_empty());
    }

    #[tokio::test]
    async fn test_unhide_restores_feed() {
        let db = test_db().await;
        let repo = db.prefs();

        repo.hide("79991234567", "item-1").await.unwrap();
        repo.unhide("79991234567", "item-1").await.unwrap();
        // Unhiding a never-hidden item is fine
        repo.unhide("79991234567", "item-2").await.unwrap();

        let prefs = repo.load_for("79991234567").await.unwrap();
        assert!(prefs.hidden.is_empty());
    }

    #[tokio::test]
    async fn test_like_and_hide_are_independent_marks() {
        let db = test_db().await;
        let repo = db.prefs();

        repo.toggle_like("79991234567", "item-1").await.unwrap();
        repo.hide("79991234567", "item-1").await.unwrap();
        repo.unhide("79991234567", "item-1").await.unwrap();

        let prefs = repo.load_for("79991234567").await.unwrap();
        assert!(prefs.liked.contains("item-1"));
        assert!(prefs.hidden.is_empty());
    }

    #[tokio::test]
    async fn test_account_removal_clears_marks_on_owned_items() {
        let db = test_db().await;
        let prefs = db.prefs();
        let items = db.items();

        let new_item = |owner: &str| crate::repository::item::NewItem {
            title: "Стол".to_string(),
            description: String::new(),
            category: "Мебель".to_string(),
            subcategory: None,
            location: String::new(),
            coords: None,
            price: None,
            bank: None,
            age_markers: vec!["0-1".to_string()],
            attachments: vec![],
            user_phone: owner.to_string(),
        };

        let leaving = items.insert(new_item("79991234567")).await.unwrap();
        let staying = items.insert(new_item("79000000000")).await.unwrap();

        // Another viewer marked both sellers' items
        prefs.toggle_like("79123456789", &leaving.id).await.unwrap();
        prefs.hide("79123456789", &leaving.id).await.unwrap();
        prefs.toggle_like("79123456789", &staying.id).await.unwrap();

        // Account removal order: marks on owned items, then the items
        prefs.remove_for_owned_items("79991234567").await.unwrap();
        items.delete_by_owner("79991234567").await.unwrap();

        let remaining = prefs.load_for("79123456789").await.unwrap();
        assert!(!remaining.liked.contains(&leaving.id));
        assert!(remaining.hidden.is_empty());
        assert!(remaining.liked.contains(&staying.id));
    }

    #[tokio::test]
    async fn test_remove_for_item_clears_all_viewers() {
        let db = test_db().await;
        let repo = db.prefs();

        repo.toggle_like("79991234567", "item-1").await.unwrap();
        repo.hide("79000000000", "item-1").await.unwrap();
        repo.toggle_like("79991234567", "item-2").await.unwrap();

        repo.remove_for_item("item-1").await.unwrap();

        assert!(repo
            .load_for("79991234567")
            .await
            .unwrap()
            .liked
            .contains("item-2"));
        assert!(!repo
            .load_for("79991234567")
            .await
            .unwrap()
            .liked
            .contains("item-1"));
        assert!(repo.load_for("79000000000").await.unwrap().hidden.is_empty());
    }
}
