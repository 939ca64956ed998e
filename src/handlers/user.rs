use crate::error::AppResult;
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpRequest, HttpResponse, web};

#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user's profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let user = current_user(&req)?;
    let profile = user_service.get_user_profile(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/user/profile",
    tag = "user",
    request_body = UpdateProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let user = current_user(&req)?;
    let profile = user_service
        .update_user_profile(user.id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(profile, "Profile updated")))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/referrals",
    tag = "user",
    params(
        ("page" = Option<u64>, Query, description = "Page number, starting at 1"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Users who signed up with the caller's referral code"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_referrals(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> AppResult<HttpResponse> {
    let user = current_user(&req)?;
    let referrals = user_service.get_user_referrals(user.id, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(referrals)))
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("/referrals", web::get().to(get_referrals)),
    );
}
