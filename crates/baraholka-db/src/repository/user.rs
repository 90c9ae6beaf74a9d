//! # User Repository
//!
//! Database operations for user accounts.
//!
//! ## Phone-Keyed Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Registration input: "8 (999) 123-45-67"                            │
//! │       │                                                             │
//! │       │  normalize_phone (baraholka-core)                           │
//! │       ▼                                                             │
//! │  Canonical digits: "79991234567"                                    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  users.phone (UNIQUE) ← every later lookup uses this form           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers MUST pass phones in canonical form; this repository never
//! normalizes. That keeps normalization in one place (the command boundary).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use baraholka_core::{AddressDetails, User};

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw database row for a user.
///
/// JSON payload columns (`address_details`, `availability`) are stored as
/// TEXT and decoded in [`TryFrom`].
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    phone: String,
    name: String,
    password: String,
    address: Option<String>,
    address_details: Option<String>,
    availability: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let address_details: Option<AddressDetails> = row
            .address_details
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let availability: BTreeMap<String, String> = serde_json::from_str(&row.availability)?;

        Ok(User {
            id: row.id,
            phone: row.phone,
            name: row.name,
            password: row.password,
            address: row.address,
            address_details,
            availability,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Fields for creating a user. The id and timestamp are generated here.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Canonical phone digits.
    pub phone: String,
    pub name: String,
    pub password: String,
    pub address: Option<String>,
    pub address_details: Option<AddressDetails>,
    pub availability: BTreeMap<String, String>,
}

/// Profile fields that may be updated. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub address_details: Option<AddressDetails>,
    pub availability: Option<BTreeMap<String, String>>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.users();
/// let user = repo.insert(new_user).await?;
/// let found = repo.find_by_phone("79991234567").await?;
/// ```
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Ok(User)` - The stored user with generated id and timestamp
    /// * `Err(DbError::UniqueViolation)` - Phone already registered
    pub async fn insert(&self, new: NewUser) -> DbResult<User> {
        debug!(phone = %new.phone, "Inserting user");

        let user = User {
            id: Uuid::new_v4().to_string(),
            phone: new.phone,
            name: new.name,
            password: new.password,
            address: new.address,
            address_details: new.address_details,
            availability: new.availability,
            created_at: Utc::now(),
        };

        let address_details_json = user
            .address_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let availability_json = serde_json::to_string(&user.availability)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, phone, name, password,
                address, address_details, availability, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.phone)
        .bind(&user.name)
        .bind(&user.password)
        .bind(&user.address)
        .bind(&address_details_json)
        .bind(&availability_json)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("phone", &user.phone),
            other => other,
        })?;

        Ok(user)
    }

    /// Finds a user by canonical phone.
    ///
    /// ## Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No account with this phone
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, phone, name, password,
                   address, address_details, availability, created_at
            FROM users
            WHERE phone = ?1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Gets a user by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, phone, name, password,
                   address, address_details, availability, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Updates a user's profile fields. Fields set to `None` are untouched.
    ///
    /// The phone is identity and is never updated.
    ///
    /// ## Returns
    /// * `Ok(User)` - The updated user
    /// * `Err(DbError::NotFound)` - User doesn't exist
    pub async fn update(&self, id: &str, update: UpdateUser) -> DbResult<User> {
        debug!(id = %id, "Updating user profile");

        let address_details_json = update
            .address_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let availability_json = update
            .availability
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?2, name),
                password = COALESCE(?3, password),
                address = COALESCE(?4, address),
                address_details = COALESCE(?5, address_details),
                availability = COALESCE(?6, availability)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.password)
        .bind(&update.address)
        .bind(&address_details_json)
        .bind(&availability_json)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes a user account.
    ///
    /// Listings are not cascaded: the command layer removes the user's items
    /// first so that the two deletions are observable separately in logs.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts registered users (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
