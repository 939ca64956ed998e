use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify};

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 128;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// 8-128 characters with at least one upper case letter, one lower case
/// letter and one digit.
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(AppError::ValidationError(format!(
            "Password must be between {MIN_LEN} and {MAX_LEN} characters"
        )));
    }

    let missing: Vec<&str> = [
        (password.chars().any(char::is_uppercase), "an upper case letter"),
        (password.chars().any(char::is_lowercase), "a lower case letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
    ]
    .into_iter()
    .filter_map(|(present, what)| (!present).then_some(what))
    .collect();

    if !missing.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Password must contain {}",
            missing.join(" and ")
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, HASH_COST).map_err(|e| {
        log::error!("bcrypt hash failed: {e}");
        AppError::InternalError("Password hashing failed".to_string())
    })
}

/// A stored hash bcrypt cannot parse is an internal error, not a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash).map_err(|e| {
        log::error!("bcrypt verify failed: {e}");
        AppError::InternalError("Password verification failed".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: AppResult<()>) -> String {
        match result {
            Err(AppError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password("Password123").is_ok());
        assert_eq!(
            message(validate_password("password123")),
            "Password must contain an upper case letter"
        );
        assert_eq!(
            message(validate_password("PASSWORD")),
            "Password must contain a lower case letter and a digit"
        );
        assert_eq!(
            message(validate_password("Pass123")),
            "Password must be between 8 and 128 characters"
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // 128 characters, 253 bytes
        assert!(validate_password(&format!("Aa1{}", "é".repeat(125))).is_ok());
        assert!(validate_password(&format!("Aa1{}", "é".repeat(126))).is_err());
    }

    #[test]
    fn test_hash_round_trip() {
        let hashed = hash_password("Password123").unwrap();
        assert!(verify_password("Password123", &hashed).unwrap());
        assert!(!verify_password("Password124", &hashed).unwrap());
        assert!(verify_password("Password123", "not-a-bcrypt-hash").is_err());
    }
}
