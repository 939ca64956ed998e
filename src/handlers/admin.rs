//! Management endpoints. Staff (employee, manager, admin) handle packages,
//! enquiries and callbacks; user administration is admin-only.

use crate::error::AppResult;
use crate::middlewares::{require_admin, require_staff};
use crate::models::*;
use crate::services::{
    CallbackService, DashboardService, EnquiryService, PackageService, UserService,
};
use actix_web::{HttpRequest, HttpResponse, web};

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Headline counts", body = DashboardStats),
        (status = 403, description = "Staff only")
    )
)]
pub async fn dashboard(
    dashboard_service: web::Data<DashboardService>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let stats = dashboard_service.get_stats().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

// Packages

#[utoipa::path(
    get,
    path = "/api/v1/admin/packages",
    tag = "admin",
    params(
        (
            "category" = Option<PackageCategory>,
            Query,
            description = "Only packages offering this category"
        ),
        ("destination" = Option<String>, Query, description = "Case-insensitive destination match"),
        ("search" = Option<String>, Query, description = "Match on title"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All packages, including inactive ones"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_packages(
    package_service: web::Data<PackageService>,
    req: HttpRequest,
    query: web::Query<PackageQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let packages = package_service.list_all(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(packages)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/packages",
    tag = "admin",
    request_body = CreatePackageRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Package created", body = PackageResponse),
        (status = 400, description = "Invalid input or slug taken"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_package(
    package_service: web::Data<PackageService>,
    req: HttpRequest,
    request: web::Json<CreatePackageRequest>,
) -> AppResult<HttpResponse> {
    let staff = require_staff(&req)?;
    let package = package_service.create_package(request.into_inner()).await?;
    log::info!("Package {} created by {}", package.id, staff.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(package)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/packages/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Package id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Package detail", body = PackageResponse),
        (status = 404, description = "Package not found")
    )
)]
pub async fn get_package(
    package_service: web::Data<PackageService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let package = package_service.get_package(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(package)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/packages/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Package id")),
    request_body = UpdatePackageRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Package updated", body = PackageResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Package not found")
    )
)]
pub async fn update_package(
    package_service: web::Data<PackageService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePackageRequest>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let package = package_service
        .update_package(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(package)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/packages/{id}/active",
    tag = "admin",
    params(("id" = i64, Path, description = "Package id")),
    request_body = SetPackageActiveRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visibility changed", body = PackageResponse),
        (status = 404, description = "Package not found")
    )
)]
pub async fn set_package_active(
    package_service: web::Data<PackageService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<SetPackageActiveRequest>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let package = package_service
        .set_active(path.into_inner(), request.is_active)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(package)))
}

// Enquiries

#[utoipa::path(
    get,
    path = "/api/v1/admin/enquiries",
    tag = "admin",
    params(
        ("status" = Option<EnquiryStatus>, Query, description = "Filter by status"),
        ("source" = Option<EnquirySource>, Query, description = "Filter by source"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enquiries, newest first"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_enquiries(
    enquiry_service: web::Data<EnquiryService>,
    req: HttpRequest,
    query: web::Query<EnquiryQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let enquiries = enquiry_service.list_enquiries(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(enquiries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/enquiries/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Enquiry id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enquiry with package and assignee", body = EnquiryDetail),
        (status = 404, description = "Enquiry not found")
    )
)]
pub async fn get_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let enquiry = enquiry_service.get_enquiry(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(enquiry)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/enquiries/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Enquiry id")),
    request_body = UpdateEnquiryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enquiry updated", body = EnquiryResponse),
        (status = 400, description = "Invalid input or assignee is not staff"),
        (status = 404, description = "Enquiry not found")
    )
)]
pub async fn update_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateEnquiryRequest>,
) -> AppResult<HttpResponse> {
    let staff = require_staff(&req)?;
    let enquiry = enquiry_service
        .update_enquiry(staff.id, path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(enquiry)))
}

// Callbacks

#[utoipa::path(
    get,
    path = "/api/v1/admin/callbacks",
    tag = "admin",
    params(
        ("status" = Option<CallbackStatus>, Query, description = "Filter by status"),
        ("source" = Option<CallbackSource>, Query, description = "Filter by source"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Callback requests, newest first"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_callbacks(
    callback_service: web::Data<CallbackService>,
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&req)?;
    let callbacks = callback_service.list_callbacks(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(callbacks)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/callbacks/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Callback request id")),
    request_body = UpdateCallbackRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Callback request updated", body = CallbackResponse),
        (status = 400, description = "Invalid input or assignee is not staff"),
        (status = 404, description = "Callback request not found")
    )
)]
pub async fn update_callback(
    callback_service: web::Data<CallbackService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCallbackRequest>,
) -> AppResult<HttpResponse> {
    let staff = require_staff(&req)?;
    let callback = callback_service
        .update_callback(staff.id, path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(callback)))
}

// Users

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    params(
        ("role" = Option<UserRole>, Query, description = "Filter by role"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered users"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<UserQuery>,
) -> AppResult<HttpResponse> {
    require_admin(&req)?;
    let users = user_service.list_users(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    tag = "admin",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Cannot change own role"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateRoleRequest>,
) -> AppResult<HttpResponse> {
    let admin = require_admin(&req)?;
    let user = user_service
        .update_role(admin.id, path.into_inner(), request.role)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/wallet",
    tag = "admin",
    params(("id" = i64, Path, description = "User id")),
    request_body = AdjustWalletRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Wallet adjusted", body = UserResponse),
        (status = 400, description = "Zero amount or insufficient balance"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn adjust_user_wallet(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AdjustWalletRequest>,
) -> AppResult<HttpResponse> {
    let admin = require_admin(&req)?;
    let user = user_service
        .adjust_wallet(admin.id, path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(dashboard))
            .route("/packages", web::get().to(list_packages))
            .route("/packages", web::post().to(create_package))
            .route("/packages/{id}", web::get().to(get_package))
            .route("/packages/{id}", web::put().to(update_package))
            .route("/packages/{id}/active", web::put().to(set_package_active))
            .route("/enquiries", web::get().to(list_enquiries))
            .route("/enquiries/{id}", web::get().to(get_enquiry))
            .route("/enquiries/{id}", web::put().to(update_enquiry))
            .route("/callbacks", web::get().to(list_callbacks))
            .route("/callbacks/{id}", web::put().to(update_callback))
            .route("/users", web::get().to(list_users))
            .route("/users/{id}/role", web::put().to(update_user_role))
            .route("/users/{id}/wallet", web::put().to(adjust_user_wallet)),
    );
}
