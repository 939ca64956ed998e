use crate::database::DbPool;
use crate::entities::package_entity as packages;
use crate::entities::packages::{
    Activities, AvailableDates, CategoryPrices, Destinations, Itinerary,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_slug;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

#[derive(Clone)]
pub struct PackageService {
    pool: DbPool,
}

impl PackageService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn ensure_slug_free(&self, slug: &str, except_id: Option<i64>) -> AppResult<()> {
        let mut query = packages::Entity::find().filter(packages::Column::Slug.eq(slug));
        if let Some(id) = except_id {
            query = query.filter(packages::Column::Id.ne(id));
        }

        if query.count(self.pool.as_ref()).await? > 0 {
            return Err(AppError::ValidationError(format!(
                "A package with slug '{slug}' already exists"
            )));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<packages::Model> {
        packages::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Package not found".to_string()))
    }

    pub async fn create_package(
        &self,
        request: CreatePackageRequest,
    ) -> AppResult<PackageResponse> {
        let package = request.validate()?;
        self.ensure_slug_free(&package.slug, None).await?;

        let now = Utc::now();
        let model = packages::ActiveModel {
            title: Set(package.title),
            slug: Set(package.slug),
            description: Set(package.description),
            duration: Set(package.duration),
            category_and_price: Set(CategoryPrices(package.category_and_price)),
            featured_image: Set(package.featured_image),
            destinations: Set(Destinations(package.destinations)),
            itinerary: Set(Itinerary(package.itinerary)),
            activities: Set(Activities(package.activities)),
            available_dates: Set(AvailableDates(package.available_dates)),
            is_active: Set(package.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Created package {} ({})", model.id, model.slug);
        Ok(PackageResponse::from(model))
    }

    pub async fn update_package(
        &self,
        id: i64,
        request: UpdatePackageRequest,
    ) -> AppResult<PackageResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let existing = self.find_by_id(id).await?;
        let mut model = existing.into_active_model();

        if let Some(title) = &request.title {
            model.title = Set(require_text("Title", title, 200)?);
        }
        if let Some(slug) = &request.slug {
            let slug = slug.trim();
            validate_slug(slug)?;
            self.ensure_slug_free(slug, Some(id)).await?;
            model.slug = Set(slug.to_string());
        }
        if let Some(description) = &request.description {
            model.description = Set(optional_text("Description", Some(description), 10_000)?);
        }
        if let Some(duration) = &request.duration {
            model.duration = Set(optional_text("Duration", Some(duration), 50)?);
        }
        if let Some(entries) = request.category_and_price {
            validate_category_prices(&entries)?;
            model.category_and_price = Set(CategoryPrices(entries));
        }
        if let Some(image) = &request.featured_image {
            model.featured_image = Set(require_text("Featured image", image, 2048)?);
        }
        if let Some(destinations) = &request.destinations {
            model.destinations = Set(Destinations(normalize_destinations(destinations)?));
        }
        if let Some(itinerary) = request.itinerary {
            validate_itinerary(&itinerary)?;
            model.itinerary = Set(Itinerary(itinerary));
        }
        if let Some(activities) = request.activities {
            validate_activities(&activities)?;
            model.activities = Set(Activities(activities));
        }
        if let Some(dates) = &request.available_dates {
            model.available_dates = Set(AvailableDates(normalize_available_dates(dates)));
        }
        if let Some(active) = request.is_active {
            model.is_active = Set(active);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(self.pool.as_ref()).await?;
        log::info!("Updated package {}", updated.id);
        Ok(PackageResponse::from(updated))
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> AppResult<PackageResponse> {
        let mut model = self.find_by_id(id).await?.into_active_model();
        model.is_active = Set(is_active);
        model.updated_at = Set(Utc::now());

        let updated = model.update(self.pool.as_ref()).await?;
        log::info!("Package {} active={}", updated.id, updated.is_active);
        Ok(PackageResponse::from(updated))
    }

    /// Public lookup; inactive packages are hidden.
    pub async fn get_active_by_slug(&self, slug: &str) -> AppResult<PackageResponse> {
        packages::Entity::find()
            .filter(packages::Column::Slug.eq(slug))
            .filter(packages::Column::IsActive.eq(true))
            .one(self.pool.as_ref())
            .await?
            .map(PackageResponse::from)
            .ok_or_else(|| AppError::NotFound("Package not found".to_string()))
    }

    pub async fn get_package(&self, id: i64) -> AppResult<PackageResponse> {
        self.find_by_id(id).await.map(PackageResponse::from)
    }

    pub async fn list_active(
        &self,
        query: PackageQuery,
    ) -> AppResult<PaginatedResponse<PackageResponse>> {
        let select = packages::Entity::find().filter(packages::Column::IsActive.eq(true));
        self.list(select, query).await
    }

    pub async fn list_all(
        &self,
        query: PackageQuery,
    ) -> AppResult<PaginatedResponse<PackageResponse>> {
        self.list(packages::Entity::find(), query).await
    }

    async fn list(
        &self,
        mut select: Select<packages::Entity>,
        query: PackageQuery,
    ) -> AppResult<PaginatedResponse<PackageResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        if let Some(category) = query.category {
            let needle = serde_json::json!([{ "category": category }]).to_string();
            select = select.filter(Expr::cust_with_values(
                "category_and_price @> $1::jsonb",
                [needle],
            ));
        }
        if let Some(destination) = query.destination.as_deref().map(str::trim)
            && !destination.is_empty()
        {
            let matches_any = "EXISTS (SELECT 1 FROM jsonb_array_elements_text(destinations) AS d \
                               WHERE d ILIKE $1)";
            select = select.filter(Expr::cust_with_values(
                matches_any,
                [like_pattern(destination)],
            ));
        }
        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            select = select.filter(Expr::cust_with_values(
                "title ILIKE $1",
                [like_pattern(search)],
            ));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let models = select
            .order_by_desc(packages::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;
        let items = models.into_iter().map(PackageResponse::from).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CategoryPrice, PackageCategory};
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn standard_price() -> Vec<CategoryPrice> {
        vec![CategoryPrice {
            category: PackageCategory::Standard,
            price: 1_899_900,
        }]
    }

    fn package(id: i64, slug: &str) -> packages::Model {
        let at = Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap();
        packages::Model {
            id,
            title: "Kerala Backwaters Escape".to_string(),
            slug: slug.to_string(),
            description: None,
            duration: Some("4N/5D".to_string()),
            category_and_price: CategoryPrices(standard_price()),
            featured_image: "https://cdn.example.com/kerala.jpg".to_string(),
            destinations: Destinations(vec!["Alleppey".to_string()]),
            itinerary: Itinerary(vec![]),
            activities: Activities(vec![]),
            available_dates: AvailableDates(vec![]),
            is_active: true,
            created_at: at,
            updated_at: at,
        }
    }

    fn slug_error(result: AppResult<PackageResponse>) -> String {
        match result {
            Err(AppError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_create_rejects_taken_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .into_connection();
        let service = PackageService::new(Arc::new(db));

        let request = CreatePackageRequest {
            title: "Kerala Backwaters Escape".to_string(),
            slug: None,
            description: None,
            duration: None,
            category_and_price: standard_price(),
            featured_image: "https://cdn.example.com/kerala.jpg".to_string(),
            destinations: vec!["Alleppey".to_string()],
            itinerary: vec![],
            activities: vec![],
            available_dates: vec![],
            is_active: None,
        };
        assert_eq!(
            slug_error(service.create_package(request).await),
            "A package with slug 'kerala-backwaters-escape' already exists"
        );
    }

    #[actix_web::test]
    async fn test_update_checks_slug_against_other_packages() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[package(3, "kerala-backwaters-escape")]])
            .append_query_results([[count_row(1)]]);
        let db = Arc::new(db.into_connection());
        let service = PackageService::new(db.clone());

        let request = UpdatePackageRequest {
            slug: Some("goa-getaway".to_string()),
            ..Default::default()
        };
        assert_eq!(
            slug_error(service.update_package(3, request).await),
            "A package with slug 'goa-getaway' already exists"
        );

        drop(service);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains(r#"\"id\" <> $2"#));
        assert!(log.contains("goa-getaway"));
    }

    #[actix_web::test]
    async fn test_update_keeps_own_slug_free() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[package(3, "kerala-backwaters-escape")]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[package(3, "goa-getaway")]])
            .into_connection();
        let service = PackageService::new(Arc::new(db));

        let request = UpdatePackageRequest {
            slug: Some(" goa-getaway ".to_string()),
            ..Default::default()
        };
        let updated = service.update_package(3, request).await.unwrap();
        assert_eq!(updated.slug, "goa-getaway");
    }

    #[actix_web::test]
    async fn test_empty_update_is_rejected_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = PackageService::new(Arc::new(db));

        let result = service.update_package(3, UpdatePackageRequest::default()).await;
        assert_eq!(slug_error(result), "No fields to update");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("goa"), "%goa%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
