//! # baraholka-db: Database Layer for Baraholka
//!
//! This crate provides database access for the Baraholka marketplace.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Baraholka Data Flow                               │
//! │                                                                         │
//! │  HTTP Handler (book_item)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   baraholka-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │  (item.rs,    │    │  (embedded)  │    │    │
//! │  │   │               │    │   user.rs,    │    │              │    │    │
//! │  │   │ SqlitePool    │◄───│   category.rs,│    │ 001_initial_ │    │    │
//! │  │   │ WAL + FK      │    │   prefs.rs)   │    │ schema.sql   │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (baraholka.db, WAL mode)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, item, category, prefs)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use baraholka_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/baraholka.db")).await?;
//!
//! let items = db.items().list_all().await?;
//! let booked = db.items().try_book("item-id", "79991234567").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::item::{ItemRepository, NewItem, UpdateItem};
pub use repository::prefs::{PrefKind, ViewerPrefs, ViewerPrefsRepository};
pub use repository::user::{NewUser, UpdateUser, UserRepository};
