use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"))
}

/// "Kerala Backwaters & Hills!" -> "kerala-backwaters-hills"
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn validate_slug(slug: &str) -> AppResult<()> {
    if slug.len() > 200 || !slug_regex().is_match(slug) {
        return Err(AppError::ValidationError(
            "Slug must be lowercase letters, digits and single dashes".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Kerala Backwaters & Hills!"), "kerala-backwaters-hills");
        assert_eq!(slugify("  Goa 5N/6D  "), "goa-5n-6d");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("manali-honeymoon-special").is_ok());
        assert!(validate_slug("goa-5n-6d").is_ok());
        assert!(validate_slug("Manali").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("").is_err());
    }
}
