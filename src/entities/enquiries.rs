use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enquiry_status")]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "followup")]
    Followup,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "solved")]
    Solved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl std::fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnquiryStatus::Pending => write!(f, "pending"),
            EnquiryStatus::Followup => write!(f, "followup"),
            EnquiryStatus::Confirmed => write!(f, "confirmed"),
            EnquiryStatus::Solved => write!(f, "solved"),
            EnquiryStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enquiry_source")]
#[serde(rename_all = "lowercase")]
pub enum EnquirySource {
    #[default]
    #[sea_orm(string_value = "website")]
    Website,
    #[sea_orm(string_value = "whatsapp")]
    Whatsapp,
    #[sea_orm(string_value = "call")]
    Call,
    #[sea_orm(string_value = "instagram")]
    Instagram,
    #[sea_orm(string_value = "facebook")]
    Facebook,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "enquiries")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
