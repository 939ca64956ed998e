use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
    })
}

/// Trims and lower-cases, then checks the basic `local@domain.tld` shape.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let normalized = email.trim().to_lowercase();

    if normalized.len() > 255 || !email_regex().is_match(&normalized) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Asha.Rao@Example.COM ").unwrap(),
            "asha.rao@example.com"
        );
        assert!(normalize_email("no-at-sign.com").is_err());
        assert!(normalize_email("two@@example.com").is_err());
        assert!(normalize_email("spaces in@example.com").is_err());
    }
}
