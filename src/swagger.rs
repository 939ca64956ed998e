use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::user::get_referrals,
        handlers::package::list_packages,
        handlers::package::get_package_by_slug,
        handlers::enquiry::create_enquiry,
        handlers::callback::create_callback,
        handlers::admin::dashboard,
        handlers::admin::list_packages,
        handlers::admin::create_package,
        handlers::admin::get_package,
        handlers::admin::update_package,
        handlers::admin::set_package_active,
        handlers::admin::list_enquiries,
        handlers::admin::get_enquiry,
        handlers::admin::update_enquiry,
        handlers::admin::list_callbacks,
        handlers::admin::update_callback,
        handlers::admin::list_users,
        handlers::admin::update_user_role,
        handlers::admin::adjust_user_wallet,
    ),
    components(
        schemas(
            UserRole,
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            UpdateProfileRequest,
            UserResponse,
            StaffSummary,
            AuthResponse,
            UpdateRoleRequest,
            AdjustWalletRequest,
            PackageCategory,
            CategoryPrice,
            ItineraryDay,
            Activity,
            CreatePackageRequest,
            UpdatePackageRequest,
            SetPackageActiveRequest,
            PackageResponse,
            PackageSummary,
            EnquiryStatus,
            EnquirySource,
            CreateEnquiryRequest,
            UpdateEnquiryRequest,
            EnquiryResponse,
            EnquiryDetail,
            CallbackStatus,
            CallbackSource,
            CreateCallbackRequest,
            UpdateCallbackRequest,
            CallbackResponse,
            DashboardStats,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "user", description = "Signed-in customer's profile and referrals"),
        (name = "packages", description = "Public package catalogue"),
        (name = "enquiries", description = "Booking enquiries"),
        (name = "callbacks", description = "Callback requests"),
        (name = "admin", description = "Management dashboard API"),
    ),
    info(
        title = "Travel Agency API",
        version = "1.0.0",
        description = "Customer site and management dashboard REST API"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_public_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/auth/login"));
        assert!(paths.contains_key("/api/v1/packages/{slug}"));
        assert!(paths.contains_key("/api/v1/callbacks"));
        assert!(paths.contains_key("/api/v1/admin/users/{id}/wallet"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
