use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Price tier a package can be sold at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PackageCategory {
    Standard,
    Deluxe,
    Superdeluxe,
}

impl std::fmt::Display for PackageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageCategory::Standard => write!(f, "standard"),
            PackageCategory::Deluxe => write!(f, "deluxe"),
            PackageCategory::Superdeluxe => write!(f, "superdeluxe"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CategoryPrice {
    pub category: PackageCategory,
    /// Minor currency units
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ItineraryDay {
    pub day: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Activity {
    pub name: String,
    pub image: String,
}

// JSONB document columns

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct CategoryPrices(pub Vec<CategoryPrice>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Destinations(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Itinerary(pub Vec<ItineraryDay>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Activities(pub Vec<Activity>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AvailableDates(pub Vec<NaiveDate>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub category_and_price: CategoryPrices,
    pub featured_image: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub destinations: Destinations,
    #[sea_orm(column_type = "JsonBinary")]
    pub itinerary: Itinerary,
    #[sea_orm(column_type = "JsonBinary")]
    pub activities: Activities,
    #[sea_orm(column_type = "JsonBinary")]
    pub available_dates: AvailableDates,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Cheapest tier, shown on listing cards.
    pub fn starting_price(&self) -> Option<i64> {
        self.category_and_price.0.iter().map(|c| c.price).min()
    }
}
