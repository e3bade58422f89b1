use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Optional leading '+', then 10-15 digits (E.164 upper bound)
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();
}

/// Trim and validate a phone number.
///
/// Returns the trimmed number, or `None` if it does not look like a phone
/// number. The stored form is whatever the client sent minus surrounding
/// whitespace, so `+923001234567` and `923001234567` are distinct users.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if PHONE_REGEX.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Mask a phone number for logs, keeping the last four digits.
pub fn mask_phone(phone: &str) -> String {
    let visible: String = phone
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("***{}", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_local_and_international_forms() {
        assert_eq!(
            normalize_phone("03001234567").as_deref(),
            Some("03001234567")
        );
        assert_eq!(
            normalize_phone(" +923001234567 ").as_deref(),
            Some("+923001234567")
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(normalize_phone("").is_none());
        assert!(normalize_phone("12345").is_none());
        assert!(normalize_phone("0300-123-4567").is_none());
        assert!(normalize_phone("++923001234567").is_none());
        assert!(normalize_phone("phone").is_none());
    }

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask_phone("03001234567"), "***4567");
        assert_eq!(mask_phone("12"), "***12");
    }
}
