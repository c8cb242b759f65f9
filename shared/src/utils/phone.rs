//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("E.164 pattern compiles"));

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Normalize and validate in one step
pub fn to_e164(phone: &str) -> Option<String> {
    let normalized = normalize_phone_number(phone);
    E164_REGEX.is_match(&normalized).then_some(normalized)
}

/// Mask a phone number for logs (e.g., +15****2671)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("+1 (415) 555-2671"), "+14155552671");
        assert_eq!(normalize_phone_number("+44 20 7183 8750"), "+442071838750");
    }

    #[test]
    fn test_to_e164() {
        assert_eq!(to_e164("+1 415-555-2671").as_deref(), Some("+14155552671"));
        assert_eq!(to_e164("+8613812345678").as_deref(), Some("+8613812345678"));
        assert_eq!(to_e164("555-2671"), None);
        assert_eq!(to_e164("+0123456789"), None);
        assert_eq!(to_e164("+1234567890123456"), None);
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("+14155552671"), "+14****2671");
        assert_eq!(mask_phone_number("12345"), "****");
    }
}
