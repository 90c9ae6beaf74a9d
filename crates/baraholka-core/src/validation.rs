//! # Validation Module
//!
//! Input validation for the command boundary.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: HTTP handler (deserialization, type shape)
//! Layer 2: THIS MODULE - business rule validation
//! Layer 3: Database (NOT NULL, UNIQUE, CHECK constraints)
//! ```
//! Multiple layers catch different errors; validation here runs before any
//! storage write so nothing needs rolling back on bad input.

use crate::error::ValidationError;
use crate::types::Attachment;
use crate::{ANY_AGE_MARKER, MAX_ATTACHMENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates an item title.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates that a required free-text field is present.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a phone after normalization.
///
/// An input that normalizes to an empty digit string (pure punctuation,
/// letters only) cannot identify a user.
pub fn validate_normalized_phone(phone: &str) -> ValidationResult<()> {
    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }
    Ok(())
}

/// Validates the attachment list of an item.
///
/// ## Rules
/// - At most [`MAX_ATTACHMENTS`] entries
pub fn validate_attachments(attachments: &[Attachment]) -> ValidationResult<()> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(ValidationError::TooManyAttachments {
            max: MAX_ATTACHMENTS,
        });
    }
    Ok(())
}

/// Normalizes an item's age markers.
///
/// Trims entries, drops empties, and substitutes the "any age" sentinel
/// when nothing remains, so stored items always carry a non-empty set.
pub fn normalize_age_markers(raw: Vec<String>) -> Vec<String> {
    let mut markers: Vec<String> = raw
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();

    if markers.is_empty() {
        markers.push(ANY_AGE_MARKER.to_string());
    }
    markers
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaKind;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Детская коляска").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"а".repeat(201)).is_err());
        assert!(validate_title(&"а".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Анна").is_ok());
        let err = validate_required("name", "  ").unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validate_normalized_phone() {
        assert!(validate_normalized_phone("79123456789").is_ok());
        assert!(validate_normalized_phone("").is_err());
    }

    #[test]
    fn test_validate_attachments_limit() {
        let att = |n: usize| -> Vec<Attachment> {
            (0..n)
                .map(|i| Attachment {
                    kind: MediaKind::Image,
                    data: format!("data:image/png;base64,{i}"),
                })
                .collect()
        };

        assert!(validate_attachments(&att(0)).is_ok());
        assert!(validate_attachments(&att(5)).is_ok());
        assert!(validate_attachments(&att(6)).is_err());
    }

    #[test]
    fn test_age_markers_default_to_sentinel() {
        assert_eq!(normalize_age_markers(vec![]), vec![ANY_AGE_MARKER]);
        assert_eq!(
            normalize_age_markers(vec!["  ".to_string()]),
            vec![ANY_AGE_MARKER]
        );
        assert_eq!(
            normalize_age_markers(vec!["0-1".to_string(), " 3-5 ".to_string()]),
            vec!["0-1", "3-5"]
        );
    }
}
