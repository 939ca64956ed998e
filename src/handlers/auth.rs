use crate::error::AppResult;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, web};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let response = auth_service.register(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let response = auth_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid refresh token"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshTokenRequest>,
) -> AppResult<HttpResponse> {
    let response = auth_service.refresh_token(&request.refresh_token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Registered inside the `/auth` scope, which main wraps with the auth limiter.
pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh));
}
