use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope shared by every error response.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Trims a required text field and rejects it when blank or over `max` chars.
pub fn require_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Optional text: blank collapses to `None`.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> AppResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => require_text(field, v, max).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Ravi  ", 100).unwrap(), "Ravi");
        assert!(require_text("name", "   ", 100).is_err());
        assert!(require_text("name", "abcdef", 5).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("message", None, 10).unwrap(), None);
        assert_eq!(optional_text("message", Some("  "), 10).unwrap(), None);
        assert_eq!(
            optional_text("message", Some(" hi "), 10).unwrap(),
            Some("hi".to_string())
        );
        assert!(optional_text("message", Some("way too long"), 5).is_err());
    }

    #[test]
    fn test_success_envelope_skips_empty_fields() {
        let value = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "data": 1 }));
    }

    #[test]
    fn test_error_envelope() {
        let value = serde_json::to_value(ApiResponse::<()>::error("NOT_FOUND", "Package not found"))
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "error": { "code": "NOT_FOUND", "message": "Package not found" }
            })
        );
    }
}
