use crate::entities::{CallbackSource, CallbackStatus, callback_request_entity};
use crate::error::AppResult;
use crate::models::common::{optional_text, require_text};
use crate::utils::validate_phone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCallbackRequest {
    #[schema(example = "Priya Nair")]
    pub name: String,
    #[schema(example = "+919900112233")]
    pub phone: String,
    #[schema(example = "6pm - 8pm")]
    pub preferred_time: Option<String>,
    pub message: Option<String>,
    #[schema(example = "Manali")]
    pub destination: Option<String>,
    /// Defaults to `website`
    pub source: Option<CallbackSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCallbackRequest {
    pub status: Option<CallbackStatus>,
    pub remark: Option<String>,
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub unassign: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CallbackQuery {
    pub status: Option<CallbackStatus>,
    pub source: Option<CallbackSource>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallbackResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub preferred_time: Option<String>,
    pub message: Option<String>,
    pub destination: Option<String>,
    pub status: CallbackStatus,
    pub called_at: Option<DateTime<Utc>>,
    pub remark: Option<String>,
    pub assigned_to: Option<i64>,
    pub source: CallbackSource,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<callback_request_entity::Model> for CallbackResponse {
    fn from(callback: callback_request_entity::Model) -> Self {
        Self {
            id: callback.id,
            name: callback.name,
            phone: callback.phone,
            preferred_time: callback.preferred_time,
            message: callback.message,
            destination: callback.destination,
            status: callback.status,
            called_at: callback.called_at,
            remark: callback.remark,
            assigned_to: callback.assigned_to,
            source: callback.source,
            ip_address: callback.ip_address,
            user_agent: callback.user_agent,
            created_at: callback.created_at,
            updated_at: callback.updated_at,
        }
    }
}

/// Client details captured from the submitting request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCallback {
    pub name: String,
    pub phone: String,
    pub preferred_time: Option<String>,
    pub message: Option<String>,
    pub destination: Option<String>,
    pub source: CallbackSource,
}

impl CreateCallbackRequest {
    /// Only name and phone are required.
    pub fn validate(&self) -> AppResult<ValidatedCallback> {
        Ok(ValidatedCallback {
            name: require_text("Name", &self.name, 100)?,
            phone: validate_phone(&self.phone)?,
            preferred_time: optional_text("Preferred time", self.preferred_time.as_deref(), 100)?,
            message: optional_text("Message", self.message.as_deref(), 5_000)?,
            destination: optional_text("Destination", self.destination.as_deref(), 200)?,
            source: self.source.unwrap_or_default(),
        })
    }
}

impl UpdateCallbackRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.remark.is_none()
            && self.assigned_to.is_none()
            && !self.unassign
    }
}

/// `called_at` is stamped once, on the first move away from `pending`,
/// and never cleared afterwards.
pub fn next_called_at(
    previous: CallbackStatus,
    next: CallbackStatus,
    called_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match called_at {
        Some(at) => Some(at),
        None if previous == CallbackStatus::Pending && next != CallbackStatus::Pending => Some(now),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_minimal_callback_is_accepted() {
        let req: CreateCallbackRequest =
            serde_json::from_str(r#"{"name":"Priya","phone":"9900112233"}"#).unwrap();
        let validated = req.validate().unwrap();
        assert_eq!(validated.source, CallbackSource::Website);
        assert_eq!(validated.preferred_time, None);
    }

    #[test]
    fn test_name_and_phone_required() {
        let req: CreateCallbackRequest =
            serde_json::from_str(r#"{"name":"  ","phone":"9900112233"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateCallbackRequest =
            serde_json::from_str(r#"{"name":"Priya","phone":"12"}"#).unwrap();
        assert!(req.validate().is_err());

        assert!(serde_json::from_str::<CreateCallbackRequest>(r#"{"name":"Priya"}"#).is_err());
    }

    #[test]
    fn test_called_at_set_on_leaving_pending() {
        assert_eq!(
            next_called_at(CallbackStatus::Pending, CallbackStatus::Called, None, at(10)),
            Some(at(10))
        );
        assert_eq!(
            next_called_at(CallbackStatus::Pending, CallbackStatus::NoAnswer, None, at(10)),
            Some(at(10))
        );
    }

    #[test]
    fn test_called_at_untouched_otherwise() {
        // staying pending
        assert_eq!(
            next_called_at(CallbackStatus::Pending, CallbackStatus::Pending, None, at(10)),
            None
        );
        // already stamped
        assert_eq!(
            next_called_at(CallbackStatus::NoAnswer, CallbackStatus::Called, Some(at(9)), at(10)),
            Some(at(9))
        );
        // back to pending keeps the original stamp
        assert_eq!(
            next_called_at(CallbackStatus::Called, CallbackStatus::Pending, Some(at(9)), at(10)),
            Some(at(9))
        );
        // non-pending to non-pending with no stamp stays unset
        assert_eq!(
            next_called_at(CallbackStatus::Called, CallbackStatus::Interested, None, at(10)),
            None
        );
    }

    #[test]
    fn test_kebab_case_wire_format() {
        let status: CallbackStatus = serde_json::from_str(r#""not-interested""#).unwrap();
        assert_eq!(status, CallbackStatus::NotInterested);
        let source: CallbackSource = serde_json::from_str(r#""package-page""#).unwrap();
        assert_eq!(source, CallbackSource::PackagePage);
        assert_eq!(
            serde_json::to_string(&CallbackStatus::NoAnswer).unwrap(),
            r#""no-answer""#
        );
    }
}
