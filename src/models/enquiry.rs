use crate::entities::{EnquirySource, EnquiryStatus, enquiry_entity};
use crate::error::{AppError, AppResult};
use crate::models::common::{optional_text, require_text};
use crate::models::package::PackageSummary;
use crate::models::user::StaffSummary;
use crate::utils::{normalize_email, validate_phone};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEnquiryRequest {
    #[schema(example = "Rahul Mehta")]
    pub name: String,
    #[schema(example = "rahul@example.com")]
    pub email: String,
    #[schema(example = "+919812345678")]
    pub phone: String,
    #[schema(example = 4)]
    pub no_of_guests: i32,
    #[schema(example = "2026-12-20")]
    pub check_in_date: NaiveDate,
    #[schema(example = "2026-12-25")]
    pub check_out_date: NaiveDate,
    pub package_id: Option<i64>,
    pub message: Option<String>,
    /// Defaults to `website`
    pub source: Option<EnquirySource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEnquiryRequest {
    pub status: Option<EnquiryStatus>,
    pub remark: Option<String>,
    pub assigned_to: Option<i64>,
    /// Clears the current assignee; ignored when `assigned_to` is set
    #[serde(default)]
    pub unassign: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EnquiryQuery {
    pub status: Option<EnquiryStatus>,
    pub source: Option<EnquirySource>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnquiryResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub no_of_guests: i32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub package_id: Option<i64>,
    pub message: Option<String>,
    pub status: EnquiryStatus,
    pub remark: Option<String>,
    pub assigned_to: Option<i64>,
    pub source: EnquirySource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<enquiry_entity::Model> for EnquiryResponse {
    fn from(enquiry: enquiry_entity::Model) -> Self {
        Self {
            id: enquiry.id,
            name: enquiry.name,
            email: enquiry.email,
            phone: enquiry.phone,
            no_of_guests: enquiry.no_of_guests,
            check_in_date: enquiry.check_in_date,
            check_out_date: enquiry.check_out_date,
            package_id: enquiry.package_id,
            message: enquiry.message,
            status: enquiry.status,
            remark: enquiry.remark,
            assigned_to: enquiry.assigned_to,
            source: enquiry.source,
            created_at: enquiry.created_at,
            updated_at: enquiry.updated_at,
        }
    }
}

/// Enquiry with its weak references resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnquiryDetail {
    pub enquiry: EnquiryResponse,
    pub package: Option<PackageSummary>,
    pub assignee: Option<StaffSummary>,
}

/// Check-out must fall strictly after check-in.
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<()> {
    if check_out <= check_in {
        return Err(AppError::ValidationError(
            "Check-out date must be after check-in date".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_guests(no_of_guests: i32) -> AppResult<()> {
    if no_of_guests <= 0 {
        return Err(AppError::ValidationError(
            "Number of guests must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEnquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub no_of_guests: i32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub package_id: Option<i64>,
    pub message: Option<String>,
    pub source: EnquirySource,
}

impl CreateEnquiryRequest {
    pub fn validate(&self) -> AppResult<ValidatedEnquiry> {
        validate_guests(self.no_of_guests)?;
        validate_stay(self.check_in_date, self.check_out_date)?;

        Ok(ValidatedEnquiry {
            name: require_text("Name", &self.name, 100)?,
            email: normalize_email(&self.email)?,
            phone: validate_phone(&self.phone)?,
            no_of_guests: self.no_of_guests,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            package_id: self.package_id,
            message: optional_text("Message", self.message.as_deref(), 5_000)?,
            source: self.source.unwrap_or_default(),
        })
    }
}

impl UpdateEnquiryRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.remark.is_none()
            && self.assigned_to.is_none()
            && !self.unassign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> CreateEnquiryRequest {
        CreateEnquiryRequest {
            name: "Rahul Mehta".to_string(),
            email: "Rahul@Example.com".to_string(),
            phone: "+91 98123 45678".to_string(),
            no_of_guests: 2,
            check_in_date: date(2026, 12, 20),
            check_out_date: date(2026, 12, 25),
            package_id: Some(7),
            message: None,
            source: None,
        }
    }

    #[test]
    fn test_valid_enquiry_defaults_source() {
        let validated = request().validate().unwrap();
        assert_eq!(validated.source, EnquirySource::Website);
        assert_eq!(validated.email, "rahul@example.com");
        assert_eq!(validated.phone, "+919812345678");
    }

    #[test]
    fn test_check_out_must_follow_check_in() {
        let mut req = request();
        req.check_out_date = req.check_in_date;
        assert!(req.validate().is_err());

        req.check_out_date = date(2026, 12, 19);
        assert!(req.validate().is_err());

        req.check_out_date = date(2026, 12, 21);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_guest_count_must_be_positive() {
        let mut req = request();
        req.no_of_guests = 0;
        assert!(req.validate().is_err());
        req.no_of_guests = -3;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_and_source_wire_format() {
        let update: UpdateEnquiryRequest =
            serde_json::from_str(r#"{"status":"followup","remark":"Call after 6pm"}"#).unwrap();
        assert_eq!(update.status, Some(EnquiryStatus::Followup));
        assert!(!update.unassign);
        assert!(!update.is_empty());

        assert!(serde_json::from_str::<UpdateEnquiryRequest>(r#"{"status":"closed"}"#).is_err());

        let source: EnquirySource = serde_json::from_str(r#""whatsapp""#).unwrap();
        assert_eq!(source, EnquirySource::Whatsapp);
    }
}
