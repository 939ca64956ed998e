use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{10,15}$").expect("valid phone regex"))
}

/// Strips spaces, dashes, dots and brackets so "+91 98765-43210" and
/// "(987) 654 3210" are stored uniformly.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Accepts 10-15 digits with an optional leading `+`.
pub fn validate_phone(phone: &str) -> AppResult<String> {
    let normalized = normalize_phone(phone);

    if !phone_regex().is_match(&normalized) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected 10-15 digits".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("+91 98765-43210").unwrap(), "+919876543210");
        assert_eq!(validate_phone("(987) 654 3210").unwrap(), "9876543210");
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("98765+43210").is_err());
    }
}
