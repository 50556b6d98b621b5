//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// E.164: '+', a country code without leading zero, 7 to 15 digits in total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{6,14}$").unwrap()
});

/// Normalize a phone number by removing common formatting characters.
///
/// A leading international call prefix (`00`) is rewritten to `+`.
pub fn normalize_phone_number(phone: &str) -> String {
    let stripped: String = phone
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    match stripped.strip_prefix("00") {
        Some(rest) if !stripped.starts_with('+') => format!("+{}", rest),
        _ => stripped,
    }
}

/// Check if an already normalized phone number is in E.164 format
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Normalize and validate in one step, returning the canonical form
pub fn canonicalize_phone_number(phone: &str) -> Option<String> {
    let normalized = normalize_phone_number(phone);
    if is_valid_e164(&normalized) {
        Some(normalized)
    } else {
        None
    }
}

/// Mask a phone number for logs and audit rows (e.g. +15****0100)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
