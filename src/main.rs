use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use serde_json::json;
use std::io::Write; // for env_logger custom formatter

use travel_agency_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    error::{json_error_handler, path_error_handler, query_error_handler},
    handlers,
    middlewares::{
        AuthMiddleware, RateLimit, RateLimitPolicy, RateLimiter, TrustProxy, create_cors,
    },
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        config.referral.bonus_amount,
    );
    let user_service = UserService::new(pool.clone());
    let package_service = PackageService::new(pool.clone());
    let enquiry_service = EnquiryService::new(pool.clone());
    let callback_service = CallbackService::new(pool.clone());
    let dashboard_service = DashboardService::new(pool.clone());

    // Counters live outside the factory so every worker shares them
    let auth_limiter = RateLimiter::new(RateLimitPolicy::auth(&config.rate_limit.auth));
    let api_limiter = RateLimiter::new(RateLimitPolicy::general_api(&config.rate_limit.api));

    let cors_origins = config.server.cors_origins.clone();
    let trust_proxy = config.server.trust_proxy;

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&cors_origins))
            .wrap(Logger::default())
            .app_data(TrustProxy(trust_proxy))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(package_service.clone()))
            .app_data(web::Data::new(enquiry_service.clone()))
            .app_data(web::Data::new(callback_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .configure(swagger_config)
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .wrap(RateLimit::new(auth_limiter.clone()).trust_proxy(trust_proxy))
                            .configure(handlers::auth_config),
                    )
                    .service(
                        web::scope("")
                            .wrap(RateLimit::new(api_limiter.clone()).trust_proxy(trust_proxy))
                            .configure(handlers::package_config)
                            .configure(handlers::enquiry_config)
                            .configure(handlers::callback_config)
                            .configure(handlers::user_config)
                            .configure(handlers::admin_config),
                    ),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
