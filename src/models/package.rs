use crate::entities::{Activity, CategoryPrice, ItineraryDay, PackageCategory, package_entity};
use crate::error::{AppError, AppResult};
use crate::models::common::{optional_text, require_text};
use crate::utils::{slugify, validate_slug};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePackageRequest {
    #[schema(example = "Kerala Backwaters Escape")]
    pub title: String,
    /// Derived from the title when omitted
    #[schema(example = "kerala-backwaters-escape")]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[schema(example = "4N/5D")]
    pub duration: Option<String>,
    pub category_and_price: Vec<CategoryPrice>,
    #[schema(example = "https://cdn.example.com/kerala.jpg")]
    pub featured_image: String,
    pub destinations: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub available_dates: Vec<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePackageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub category_and_price: Option<Vec<CategoryPrice>>,
    pub featured_image: Option<String>,
    pub destinations: Option<Vec<String>>,
    pub itinerary: Option<Vec<ItineraryDay>>,
    pub activities: Option<Vec<Activity>>,
    pub available_dates: Option<Vec<NaiveDate>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetPackageActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PackageQuery {
    pub category: Option<PackageCategory>,
    /// Case-insensitive destination match
    pub destination: Option<String>,
    /// Free-text match on title
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub category_and_price: Vec<CategoryPrice>,
    pub starting_price: Option<i64>,
    pub featured_image: String,
    pub destinations: Vec<String>,
    pub itinerary: Vec<ItineraryDay>,
    pub activities: Vec<Activity>,
    pub available_dates: Vec<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<package_entity::Model> for PackageResponse {
    fn from(package: package_entity::Model) -> Self {
        let starting_price = package.starting_price();
        Self {
            id: package.id,
            title: package.title,
            slug: package.slug,
            description: package.description,
            duration: package.duration,
            category_and_price: package.category_and_price.0,
            starting_price,
            featured_image: package.featured_image,
            destinations: package.destinations.0,
            itinerary: package.itinerary.0,
            activities: package.activities.0,
            available_dates: package.available_dates.0,
            is_active: package.is_active,
            created_at: package.created_at,
            updated_at: package.updated_at,
        }
    }
}

/// Short form embedded in enquiry details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

impl From<package_entity::Model> for PackageSummary {
    fn from(package: package_entity::Model) -> Self {
        Self {
            id: package.id,
            title: package.title,
            slug: package.slug,
        }
    }
}

/// Non-empty, one entry per category, every price positive.
pub fn validate_category_prices(entries: &[CategoryPrice]) -> AppResult<()> {
    if entries.is_empty() {
        return Err(AppError::ValidationError(
            "At least one category and price is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if entry.price <= 0 {
            return Err(AppError::ValidationError(format!(
                "Price for {} must be positive",
                entry.category
            )));
        }
        if !seen.insert(entry.category) {
            return Err(AppError::ValidationError(format!(
                "Duplicate category: {}",
                entry.category
            )));
        }
    }
    Ok(())
}

/// Trims each destination; the list may not be empty.
pub fn normalize_destinations(destinations: &[String]) -> AppResult<Vec<String>> {
    let cleaned: Vec<String> = destinations
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        return Err(AppError::ValidationError(
            "At least one destination is required".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Days start at 1 and strictly increase.
pub fn validate_itinerary(days: &[ItineraryDay]) -> AppResult<()> {
    let mut previous = 0;
    for day in days {
        if day.day <= previous {
            return Err(AppError::ValidationError(format!(
                "Itinerary days must start at 1 and increase (got day {} after {})",
                day.day, previous
            )));
        }
        if day.description.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Itinerary day {} needs a description",
                day.day
            )));
        }
        previous = day.day;
    }
    Ok(())
}

pub fn validate_activities(activities: &[Activity]) -> AppResult<()> {
    for activity in activities {
        require_text("Activity name", &activity.name, 200)?;
        require_text("Activity image", &activity.image, 2048)?;
    }
    Ok(())
}

/// Sorted and de-duplicated.
pub fn normalize_available_dates(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut dates = dates.to_vec();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Package fields after validation, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPackage {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub category_and_price: Vec<CategoryPrice>,
    pub featured_image: String,
    pub destinations: Vec<String>,
    pub itinerary: Vec<ItineraryDay>,
    pub activities: Vec<Activity>,
    pub available_dates: Vec<NaiveDate>,
    pub is_active: bool,
}

impl CreatePackageRequest {
    /// Shape checks only; slug uniqueness is checked against the store.
    pub fn validate(&self) -> AppResult<ValidatedPackage> {
        let title = require_text("Title", &self.title, 200)?;
        let slug = match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&title),
        };
        validate_slug(&slug)?;
        validate_category_prices(&self.category_and_price)?;
        let destinations = normalize_destinations(&self.destinations)?;
        validate_itinerary(&self.itinerary)?;
        validate_activities(&self.activities)?;

        Ok(ValidatedPackage {
            title,
            slug,
            description: optional_text("Description", self.description.as_deref(), 10_000)?,
            duration: optional_text("Duration", self.duration.as_deref(), 50)?,
            category_and_price: self.category_and_price.clone(),
            featured_image: require_text("Featured image", &self.featured_image, 2048)?,
            destinations,
            itinerary: self.itinerary.clone(),
            activities: self.activities.clone(),
            available_dates: normalize_available_dates(&self.available_dates),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

impl UpdatePackageRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.duration.is_none()
            && self.category_and_price.is_none()
            && self.featured_image.is_none()
            && self.destinations.is_none()
            && self.itinerary.is_none()
            && self.activities.is_none()
            && self.available_dates.is_none()
            && self.is_active.is_none()
    }
}
