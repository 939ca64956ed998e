use chrono::{DateTime, Utc};
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "callback_status")]
#[serde(rename_all = "kebab-case")]
pub enum CallbackStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "called")]
    Called,
    #[sea_orm(string_value = "no-answer")]
    NoAnswer,
    #[sea_orm(string_value = "interested")]
    Interested,
    #[sea_orm(string_value = "not-interested")]
    NotInterested,
}

impl std::fmt::Display for CallbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackStatus::Pending => write!(f, "pending"),
            CallbackStatus::Called => write!(f, "called"),
            CallbackStatus::NoAnswer => write!(f, "no-answer"),
            CallbackStatus::Interested => write!(f, "interested"),
            CallbackStatus::NotInterested => write!(f, "not-interested"),
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "callback_source")]
#[serde(rename_all = "kebab-case")]
pub enum CallbackSource {
    #[default]
    #[sea_orm(string_value = "website")]
    Website,
    #[sea_orm(string_value = "popup")]
    Popup,
    #[sea_orm(string_value = "package-page")]
    PackagePage,
    #[sea_orm(string_value = "footer")]
    Footer,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "callback_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
