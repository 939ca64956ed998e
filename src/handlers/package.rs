use crate::error::AppResult;
use crate::models::*;
use crate::services::PackageService;
use actix_web::{HttpResponse, web};

#[utoipa::path(
    get,
    path = "/api/v1/packages",
    tag = "packages",
    params(
        (
            "category" = Option<PackageCategory>,
            Query,
            description = "Only packages offering this category"
        ),
        ("destination" = Option<String>, Query, description = "Case-insensitive destination match"),
        ("search" = Option<String>, Query, description = "Match on title"),
        ("page" = Option<u64>, Query, description = "Page number, starting at 1"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Active packages, newest first")
    )
)]
pub async fn list_packages(
    package_service: web::Data<PackageService>,
    query: web::Query<PackageQuery>,
) -> AppResult<HttpResponse> {
    let packages = package_service.list_active(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(packages)))
}

#[utoipa::path(
    get,
    path = "/api/v1/packages/{slug}",
    tag = "packages",
    params(
        ("slug" = String, Path, description = "Package slug")
    ),
    responses(
        (status = 200, description = "Package detail", body = PackageResponse),
        (status = 404, description = "No active package with this slug")
    )
)]
pub async fn get_package_by_slug(
    package_service: web::Data<PackageService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let package = package_service.get_active_by_slug(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(package)))
}

pub fn package_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/packages")
            .route("", web::get().to(list_packages))
            .route("/{slug}", web::get().to(get_package_by_slug)),
    );
}
