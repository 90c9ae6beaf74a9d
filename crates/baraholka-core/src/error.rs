//! # Error Types
//!
//! Domain-specific error types for baraholka-core.
//!
//! ## Error Hierarchy
//! ```text
//! baraholka-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! baraholka-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! HTTP API errors (in apps/server)
//! └── ApiError         - What clients see (serialized, with status code)
//!
//! Flow: ValidationError → CoreError → ApiError → client
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, phone, category name)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Each variant maps to one failure kind of the command boundary:
/// NotFound, Conflict, Forbidden, InvalidCredentials or InvalidInput.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// User cannot be found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Category absent from the registry.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Registering a phone that already has an account.
    #[error("Phone {phone} is already registered")]
    DuplicatePhone { phone: String },

    /// A category with this trimmed name already exists.
    #[error("Category '{name}' already exists")]
    DuplicateCategory { name: String },

    /// A subcategory with this trimmed name already exists in the category.
    #[error("Subcategory '{name}' already exists in '{category}'")]
    DuplicateSubcategory { category: String, name: String },

    /// Booking attempted on an item that is already booked.
    ///
    /// ## When This Occurs
    /// - A second booker races the first; the conditional update loses
    /// - The feed was stale and the item was booked in the meantime
    #[error("Item {item_id} is already booked")]
    AlreadyBooked { item_id: String },

    /// A seller attempted to book their own item.
    #[error("Cannot book own item {item_id}")]
    OwnBooking { item_id: String },

    /// Cancel requested by someone who is neither the booker nor the owner.
    #[error("Only the booker or the owner may cancel the booking on {item_id}")]
    NotBooker { item_id: String },

    /// Edit or delete requested by someone other than the owner.
    #[error("Only the owner may modify item {item_id}")]
    NotOwner { item_id: String },

    /// Phone/password pair does not match a user.
    #[error("Invalid phone or password")]
    InvalidCredentials,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation at the command boundary before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Too many media attachments on an item.
    #[error("An item can carry at most {max} attachments")]
    TooManyAttachments { max: usize },

    /// Subcategory does not belong to the chosen category.
    #[error("Subcategory '{subcategory}' does not belong to '{category}'")]
    UnknownSubcategory {
        category: String,
        subcategory: String,
    },

    /// Invalid format (e.g. unparseable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
