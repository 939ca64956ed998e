use actix_cors::Cors;
use actix_web::http::header;

/// Browser access for the public site and the admin dashboard.
/// An empty origin list allows any origin (local development).
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![
            header::HeaderName::from_static("ratelimit"),
            header::HeaderName::from_static("ratelimit-policy"),
            header::RETRY_AFTER,
        ])
        .supports_credentials()
        .max_age(3600);

    if allowed_origins.is_empty() {
        cors = cors.allowed_origin_fn(|_, _req_head| true);
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}
