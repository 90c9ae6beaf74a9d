//! # Repository Module
//!
//! Database repository implementations for Baraholka.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                           │
//! │       │                                                                 │
//! │       │  db.items().try_book(id, viewer_phone)                          │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ItemRepository                                                         │
//! │  ├── list_all(&self)                                                    │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── try_book(&self, id, phone)    ← atomic conditional update          │
//! │  └── cancel_booking(&self, id)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Rules live in baraholka-core; repositories only persist the outcome.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts, phone-keyed identity
//! - [`item::ItemRepository`] - Listings and the booking flag
//! - [`category::CategoryRepository`] - The category registry
//! - [`prefs::ViewerPrefsRepository`] - Per-viewer liked / hidden marks

pub mod category;
pub mod item;
pub mod prefs;
pub mod user;
