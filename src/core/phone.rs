//! Recipient phone normalization.
//!
//! Phone numbers arrive in many formats (international prefix, spaces,
//! dashes). Every comparison in the crate - duplicate detection, order
//! payloads, draft snapshots - goes through the same normalization so
//! formatting variance can never defeat matching: strip non-digits and keep
//! the last 10 digits.

/// Normalizes a phone number to its last 10 digits.
///
/// Non-digit characters are stripped first, so `"+233 024 123 4567"` and
/// `"0241234567"` normalize identically. Inputs with fewer than 10 digits are
/// returned as their digit string unchanged. The function is idempotent.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

/// Returns true if the input contains exactly 10 digits after normalization.
#[must_use]
pub fn is_valid_recipient_phone(raw: &str) -> bool {
    normalize_phone(raw).len() == 10
}
