//! # Phone Normalization
//!
//! Canonical phone representation for identity comparisons.
//!
//! Users type phones in many shapes: `8 (912) 345-67-89`, `+7 912 345 67 89`
//! or a bare 10-digit local form. Ownership, booking exclusivity and the
//! unique-phone constraint all compare phones, so every phone entering the
//! system is reduced to one canonical digit string first.
//!
//! ## Rules
//! 1. Strip every non-digit character
//! 2. 11 digits starting with `8` → replace the leading `8` with `7`
//! 3. 10 digits → prepend `7`
//! 4. Anything else is returned unchanged (including the empty string)

/// Normalizes a raw phone string to canonical digits.
///
/// Deterministic and idempotent: `normalize_phone(normalize_phone(p))`
/// equals `normalize_phone(p)` for any input.
///
/// ## Example
/// ```rust
/// use baraholka_core::phone::normalize_phone;
///
/// assert_eq!(normalize_phone("8 (912) 345-67-89"), "79123456789");
/// assert_eq!(normalize_phone("+7 912 345 67 89"), "79123456789");
/// assert_eq!(normalize_phone("9123456789"), "79123456789");
/// assert_eq!(normalize_phone(""), "");
/// ```
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 11 && digits.starts_with('8') {
        let mut canonical = String::with_capacity(11);
        canonical.push('7');
        canonical.push_str(&digits[1..]);
        return canonical;
    }

    if digits.len() == 10 {
        let mut canonical = String::with_capacity(11);
        canonical.push('7');
        canonical.push_str(&digits);
        return canonical;
    }

    digits
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_converge_to_same_canonical_form() {
        assert_eq!(normalize_phone("8 (912) 345-67-89"), "79123456789");
        assert_eq!(normalize_phone("+7 912 345 67 89"), "79123456789");
        assert_eq!(normalize_phone("912-345-67-89"), "79123456789");
        assert_eq!(
            normalize_phone("8 (912) 345-67-89"),
            normalize_phone("+7 912 345 67 89")
        );
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("abc"), "");
        // Unusual lengths pass through as bare digits
        assert_eq!(normalize_phone("123"), "123");
        assert_eq!(normalize_phone("123456789012"), "123456789012");
    }

    #[test]
    fn test_leading_seven_is_kept() {
        assert_eq!(normalize_phone("79123456789"), "79123456789");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["8 (912) 345-67-89", "9123456789", "", "12345"] {
            let once = normalize_phone(raw);
            assert_eq!(normalize_phone(&once), once);
        }
    }
}
