use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Identity attached to request extensions once the access token checks out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
}

// Routes reachable without a token
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // (method, prefix): public only for that method
    method_prefixes: Vec<(Method, &'static str)>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/health",
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/auth/"],
            method_prefixes: vec![
                (Method::GET, "/api/v1/packages"),
                (Method::POST, "/api/v1/enquiries"),
                (Method::POST, "/api/v1/callbacks"),
            ],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        self.method_prefixes
            .iter()
            .any(|(m, prefix)| m == method && path.starts_with(prefix))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        let user = self
            .jwt_service
            .verify_access_token(token)
            .and_then(|claims| {
                Ok(AuthUser {
                    id: claims.user_id()?,
                    role: claims.role,
                })
            });

        match user {
            Ok(user) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// Authenticated caller for the current request.
pub fn current_user(req: &HttpRequest) -> AppResult<AuthUser> {
    req.extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

/// Caller must be an employee, manager or admin.
pub fn require_staff(req: &HttpRequest) -> AppResult<AuthUser> {
    let user = current_user(req)?;
    if !user.role.is_staff() {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}

/// Caller must be an admin.
pub fn require_admin(req: &HttpRequest) -> AppResult<AuthUser> {
    let user = current_user(req)?;
    if !user.role.can_manage_users() {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{TestRequest, call_service, init_service, read_body, try_call_service};
    use actix_web::{App, HttpResponse, http::StatusCode, web};

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();

        assert!(paths.is_public(&Method::POST, "/api/v1/auth/login"));
        assert!(paths.is_public(&Method::GET, "/api/v1/packages"));
        assert!(paths.is_public(&Method::GET, "/api/v1/packages/goa-getaway"));
        assert!(paths.is_public(&Method::POST, "/api/v1/enquiries"));
        assert!(paths.is_public(&Method::POST, "/api/v1/callbacks"));
        assert!(paths.is_public(&Method::GET, "/swagger-ui/index.html"));

        assert!(!paths.is_public(&Method::POST, "/api/v1/packages"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/enquiries"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/user/profile"));
        assert!(!paths.is_public(&Method::GET, "/api/v1/admin/dashboard"));
    }

    async fn whoami(req: HttpRequest) -> Result<HttpResponse, AppError> {
        let user = require_staff(&req)?;
        Ok(HttpResponse::Ok().body(user.id.to_string()))
    }

    #[actix_web::test]
    async fn test_token_and_role_checks() {
        let jwt = JwtService::new("test-secret", 3600, 7200);
        let app = init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/v1/admin/whoami", web::get().to(whoami)),
        )
        .await;

        // no token
        let req = TestRequest::get()
            .uri("/api/v1/admin/whoami")
            .to_request();
        let err = try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

        // customer token
        let token = jwt.generate_access_token(5, UserRole::User).unwrap();
        let req = TestRequest::get()
            .uri("/api/v1/admin/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // employee token
        let token = jwt.generate_access_token(9, UserRole::Employee).unwrap();
        let req = TestRequest::get()
            .uri("/api/v1/admin/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_body(resp).await, "9");
    }
}
