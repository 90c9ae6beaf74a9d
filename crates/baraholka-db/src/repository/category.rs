//! # Category Repository
//!
//! Persistence for the category registry.
//!
//! ## Transactional Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Registry Mutation (read-modify-write)                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├─ load all rows → CategoryRegistry (baraholka-core)                 │
//! │    │                                                                    │
//! │    ├─ registry.add_category(...)   ← duplicate/missing checks live in   │
//! │    │        │                        core, in exactly one place         │
//! │    │        └─ Err → ROLLBACK (mapped to DbError)                       │
//! │    │                                                                    │
//! │    └─ write the changed row back                                        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  SQLite serializes write transactions, so two concurrent creations      │
//! │  of the same name cannot both observe it absent.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use baraholka_core::{Category, CategoryRegistry, CoreError};

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw database row for a category. `subcategories` is a JSON array (TEXT).
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    name: String,
    subcategories: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = DbError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let subcategories: Vec<String> = serde_json::from_str(&row.subcategories)?;
        Ok(Category {
            name: row.name,
            subcategories,
        })
    }
}

/// Maps core registry violations onto database error kinds.
fn map_registry_error(err: CoreError) -> DbError {
    match err {
        CoreError::DuplicateCategory { name } => DbError::duplicate("category", name),
        CoreError::DuplicateSubcategory { name, .. } => DbError::duplicate("subcategory", name),
        CoreError::CategoryNotFound(name) => DbError::not_found("Category", name),
        // Handlers validate names before calling; anything else is a bug
        other => DbError::Internal(other.to_string()),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the category registry.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.categories();
/// repo.seed_defaults().await?;
///
/// let registry = repo.load().await?;
/// repo.add_subcategory("Книги", "Фантастика").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Loads the full registry, in insertion order.
    pub async fn load(&self) -> DbResult<CategoryRegistry> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT name, subcategories FROM categories ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let categories = rows
            .into_iter()
            .map(Category::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CategoryRegistry::from_categories(categories))
    }

    /// Seeds the default category set if the registry is empty.
    ///
    /// Called once at server startup; a populated registry is left alone.
    pub async fn seed_defaults(&self) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;

        if count > 0 {
            debug!(count, "Registry already populated, skipping seed");
            return Ok(());
        }

        let defaults = baraholka_core::default_categories();
        for (position, category) in defaults.iter().enumerate() {
            insert_row(&mut tx, category, position as i64).await?;
        }
        tx.commit().await?;

        info!(count = defaults.len(), "Seeded default categories");
        Ok(())
    }

    /// Creates a new category with an optional initial subcategory list.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The stored category (trimmed, deduped)
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn add_category(
        &self,
        name: &str,
        subcategories: Vec<String>,
    ) -> DbResult<Category> {
        debug!(name = %name, "Creating category");

        let mut tx = self.pool.begin().await?;

        let mut registry = load_in_tx(&mut tx).await?;
        let created = registry
            .add_category(name, subcategories)
            .map_err(map_registry_error)?
            .clone();

        let position = registry.len() as i64 - 1;
        insert_row(&mut tx, &created, position).await?;
        tx.commit().await?;

        Ok(created)
    }

    /// Appends a subcategory to an existing category.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Subcategory already present
    pub async fn add_subcategory(&self, category: &str, name: &str) -> DbResult<Category> {
        debug!(category = %category, name = %name, "Adding subcategory");

        let mut tx = self.pool.begin().await?;

        let mut registry = load_in_tx(&mut tx).await?;
        registry
            .add_subcategory(category, name)
            .map_err(map_registry_error)?;

        // The guard above proved the category exists
        let changed = registry
            .get(category)
            .cloned()
            .ok_or_else(|| DbError::not_found("Category", category))?;

        let subcategories_json = serde_json::to_string(&changed.subcategories)?;
        sqlx::query("UPDATE categories SET subcategories = ?2 WHERE name = ?1")
            .bind(&changed.name)
            .bind(&subcategories_json)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(changed)
    }
}

async fn load_in_tx(tx: &mut Transaction<'_, Sqlite>) -> DbResult<CategoryRegistry> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT name, subcategories FROM categories ORDER BY position",
    )
    .fetch_all(&mut **tx)
    .await?;

    let categories = rows
        .into_iter()
        .map(Category::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CategoryRegistry::from_categories(categories))
}

async fn insert_row(
    tx: &mut Transaction<'_, Sqlite>,
    category: &Category,
    position: i64,
) -> DbResult<()> {
    let subcategories_json = serde_json::to_string(&category.subcategories)?;

    sqlx::query("INSERT INTO categories (name, position, subcategories) VALUES (?1, ?2, ?3)")
        .bind(&category.name)
        .bind(position)
        .bind(&subcategories_json)
        .execute(&mut **tx)
        .await?;

    Ok(())
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
    async fn test_seed_defaults_once() {
        let db = test_db().await;
        let repo = db.categories();

        repo.seed_defaults().await.unwrap();
        let registry = repo.load().await.unwrap();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.categories()[0].name, "Учебники");

        // A second seed is a no-op
        repo.seed_defaults().await.unwrap();
        assert_eq!(repo.load().await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_seed_skips_populated_registry() {
        let db = test_db().await;
        let repo = db.categories();

        repo.add_category("Книги", vec![]).await.unwrap();
        repo.seed_defaults().await.unwrap();

        let registry = repo.load().await.unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_add_category_persists_in_order() {
        let db = test_db().await;
        let repo = db.categories();

        repo.add_category("Книги", vec!["Фантастика".to_string()])
            .await
            .unwrap();
        repo.add_category("Спорт", vec![]).await.unwrap();

        let registry = repo.load().await.unwrap();
        let names: Vec<&str> = registry
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Книги", "Спорт"]);
        assert_eq!(
            registry.get("Книги").unwrap().subcategories,
            vec!["Фантастика"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_category_conflicts_without_writing() {
        let db = test_db().await;
        let repo = db.categories();

        repo.add_category("Книги", vec![]).await.unwrap();
        let err = repo.add_category("Книги", vec![]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "category"));

        assert_eq!(repo.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_subcategory_persists() {
        let db = test_db().await;
        let repo = db.categories();

        repo.add_category("Книги", vec![]).await.unwrap();
        let changed = repo.add_subcategory("Книги", "Детективы").await.unwrap();
        assert_eq!(changed.subcategories, vec!["Детективы"]);

        let registry = repo.load().await.unwrap();
        assert_eq!(
            registry.get("Книги").unwrap().subcategories,
            vec!["Детективы"]
        );
    }

    #[tokio::test]
    async fn test_subcategory_errors_map_to_db_kinds() {
        let db = test_db().await;
        let repo = db.categories();

        let err = repo.add_subcategory("Книги", "Детективы").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        repo.add_category("Книги", vec!["Детективы".to_string()])
            .await
            .unwrap();
        let err = repo.add_subcategory("Книги", "Детективы").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field, .. } if field == "subcategory"));
    }
}
