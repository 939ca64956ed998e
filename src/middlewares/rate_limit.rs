//! Per-client request limiting.
//!
//! Two policies are in use: a strict one for the authentication endpoints and
//! a looser one for the rest of the API. Each policy counts requests per
//! client address in a fixed window. The address is the TCP peer unless the
//! middleware is told to trust a fronting proxy. Responses carry the draft-7
//! `RateLimit-Policy` / `RateLimit` headers; rejected requests get a 429 with
//! a `{ "error": ... }` body and `Retry-After`.

use crate::config::PolicyConfig;
use crate::middlewares::client_ip::client_ip;
use actix_web::body::EitherBody;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::{
    Error, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use std::collections::HashMap;
use std::future::{Ready, ready};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const AUTH_LIMIT_MESSAGE: &str = "Too many attempts, please try again later.";
pub const API_LIMIT_MESSAGE: &str = "Too many requests, calm down!";

const RATE_LIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
const RATE_LIMIT: HeaderName = HeaderName::from_static("ratelimit");

/// A (window, max-requests, rejection-message) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub name: &'static str,
    pub window: Duration,
    pub max_requests: u32,
    pub message: &'static str,
}

impl RateLimitPolicy {
    /// Login, registration and token refresh.
    pub fn auth(config: &PolicyConfig) -> Self {
        Self {
            name: "auth",
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            message: AUTH_LIMIT_MESSAGE,
        }
    }

    /// Everything else under `/api/v1`.
    pub fn general_api(config: &PolicyConfig) -> Self {
        Self {
            name: "api",
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            message: API_LIMIT_MESSAGE,
        }
    }

    fn policy_header(&self) -> String {
        format!("{};w={}", self.max_requests, self.window.as_secs())
    }
}

/// Time source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset: Duration },
    Limited { reset: Duration },
}

#[derive(Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct Counters {
    windows: HashMap<String, Window>,
    last_prune: Instant,
}

/// Shared across workers; clone freely.
#[derive(Clone)]
pub struct RateLimiter {
    policy: Arc<RateLimitPolicy>,
    counters: Arc<Mutex<Counters>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            policy: Arc::new(policy),
            counters: Arc::new(Mutex::new(Counters {
                windows: HashMap::new(),
                last_prune: now,
            })),
            clock,
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Counts one request for `key` and decides whether it may proceed.
    pub fn check(&self, key: &str) -> Decision {
        let now = self.clock.now();
        let window = self.policy.window;
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Drop expired windows at most once per window length
        if now.duration_since(counters.last_prune) >= window {
            counters
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            counters.last_prune = now;
        }

        let entry = counters
            .windows
            .entry(key.to_string())
            .or_insert(Window {
                started: now,
                hits: 0,
            });
        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.hits = 0;
        }

        let reset = window.saturating_sub(now.duration_since(entry.started));
        if entry.hits >= self.policy.max_requests {
            return Decision::Limited { reset };
        }

        entry.hits += 1;
        Decision::Allowed {
            remaining: self.policy.max_requests - entry.hits,
            reset,
        }
    }
}

/// Whole seconds until the window resets, rounded up.
fn reset_secs(reset: Duration) -> u64 {
    let secs = reset.as_secs();
    if reset.subsec_nanos() > 0 { secs + 1 } else { secs }
}

fn insert_headers(
    headers: &mut HeaderMap,
    policy: &RateLimitPolicy,
    remaining: u32,
    reset: u64,
) {
    if let Ok(value) = HeaderValue::from_str(&policy.policy_header()) {
        headers.insert(RATE_LIMIT_POLICY, value);
    }
    let state = format!(
        "limit={}, remaining={}, reset={}",
        policy.max_requests, remaining, reset
    );
    if let Ok(value) = HeaderValue::from_str(&state) {
        headers.insert(RATE_LIMIT, value);
    }
}

/// Middleware factory wrapping a scope with one policy.
pub struct RateLimit {
    limiter: RateLimiter,
    trust_proxy: bool,
}

impl RateLimit {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            limiter,
            trust_proxy: false,
        }
    }

    /// Key on `Forwarded` / `X-Forwarded-For` instead of the peer address.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
            trust_proxy: self.trust_proxy,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimiter,
    trust_proxy: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_ip(req.request(), self.trust_proxy)
            .unwrap_or_else(|| "unknown".to_string());
        let policy = self.limiter.policy().clone();

        match self.limiter.check(&key) {
            Decision::Allowed { remaining, reset } => {
                let fut = self.service.call(req);
                Box::pin(async move {
                    let mut res = fut.await?;
                    let reset = reset_secs(reset);
                    insert_headers(res.headers_mut(), &policy, remaining, reset);
                    Ok(res.map_into_left_body())
                })
            }
            Decision::Limited { reset } => {
                let reset = reset_secs(reset);
                log::warn!("Rate limit '{}' exceeded by {}", policy.name, key);

                let mut response = HttpResponse::TooManyRequests().json(json!({
                    "error": policy.message
                }));
                insert_headers(response.headers_mut(), &policy, 0, reset);
                response.headers_mut().insert(RETRY_AFTER, HeaderValue::from(reset));

                let res = req.into_response(response).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
    use actix_web::{App, HttpResponse, web};

    #[derive(Clone)]
    struct MockClock {
        now: Arc<Mutex<Instant>>,
    }

    impl MockClock {
        fn new() -> Self {
            Self {
                now: Arc::new(Mutex::new(Instant::now())),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    fn auth_policy() -> RateLimitPolicy {
        RateLimitPolicy::auth(&PolicyConfig {
            window_secs: 600,
            max_requests: 10,
        })
    }

    fn api_policy() -> RateLimitPolicy {
        RateLimitPolicy::general_api(&PolicyConfig {
            window_secs: 900,
            max_requests: 100,
        })
    }

    fn limiter(policy: RateLimitPolicy) -> RateLimiter {
        RateLimiter::with_clock(policy, Arc::new(MockClock::new()))
    }

    #[test]
    fn test_eleventh_auth_attempt_is_limited() {
        let limiter = limiter(auth_policy());

        for i in 0..10 {
            assert_eq!(
                limiter.check("10.0.0.1"),
                Decision::Allowed {
                    remaining: 9 - i,
                    reset: Duration::from_secs(600)
                }
            );
        }
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Decision::Limited { .. }
        ));
    }

    #[test]
    fn test_identities_are_counted_separately() {
        let limiter = limiter(auth_policy());

        for _ in 0..10 {
            limiter.check("10.0.0.1");
        }
        assert!(matches!(limiter.check("10.0.0.1"), Decision::Limited { .. }));
        assert!(matches!(
            limiter.check("10.0.0.2"),
            Decision::Allowed { remaining: 9, .. }
        ));
    }

    #[test]
    fn test_window_resets() {
        let clock = MockClock::new();
        let limiter = RateLimiter::with_clock(auth_policy(), Arc::new(clock.clone()));

        for _ in 0..10 {
            limiter.check("10.0.0.1");
        }
        clock.advance(Duration::from_secs(599));
        assert_eq!(
            limiter.check("10.0.0.1"),
            Decision::Limited {
                reset: Duration::from_secs(1)
            }
        );

        clock.advance(Duration::from_secs(1));
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Decision::Allowed { remaining: 9, .. }
        ));
    }

    #[test]
    fn test_expired_windows_are_pruned() {
        let clock = MockClock::new();
        let limiter = RateLimiter::with_clock(auth_policy(), Arc::new(clock.clone()));

        limiter.check("10.0.0.1");
        limiter.check("10.0.0.2");
        clock.advance(Duration::from_secs(601));
        limiter.check("10.0.0.3");

        let counters = limiter.counters.lock().unwrap();
        assert_eq!(counters.windows.len(), 1);
        assert!(counters.windows.contains_key("10.0.0.3"));
    }

    #[test]
    fn test_reset_secs_rounds_up() {
        assert_eq!(reset_secs(Duration::from_millis(1500)), 2);
        assert_eq!(reset_secs(Duration::from_secs(600)), 600);
        assert_eq!(reset_secs(Duration::ZERO), 0);
    }

    fn post_from(ip: &str, uri: &str) -> TestRequest {
        TestRequest::post()
            .uri(uri)
            .peer_addr(format!("{ip}:40000").parse().unwrap())
    }

    fn header<'a>(resp: &'a ServiceResponse<impl Sized>, name: &str) -> &'a str {
        resp.headers().get(name).unwrap().to_str().unwrap()
    }

    #[actix_web::test]
    async fn test_auth_scope_rejects_eleventh_request() {
        let app = init_service(
            App::new().service(
                web::scope("/api/v1/auth")
                    .wrap(RateLimit::new(limiter(auth_policy())))
                    .route("/login", web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;
        let login = "/api/v1/auth/login";

        for i in 0..10u32 {
            let resp = call_service(&app, post_from("203.0.113.7", login).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(header(&resp, "ratelimit-policy"), "10;w=600");
            assert_eq!(
                header(&resp, "ratelimit"),
                format!("limit=10, remaining={}, reset=600", 9 - i)
            );
            assert!(resp.headers().get("x-ratelimit-limit").is_none());
        }

        let resp = call_service(&app, post_from("203.0.113.7", login).to_request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(header(&resp, "retry-after"), "600");
        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "error": "Too many attempts, please try again later." })
        );

        // another client is unaffected
        let resp = call_service(&app, post_from("203.0.113.8", login).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_rotating_forwarded_for_does_not_reset_the_count() {
        let app = init_service(
            App::new().service(
                web::scope("/api/v1/auth")
                    .wrap(RateLimit::new(limiter(auth_policy())))
                    .route("/login", web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let mut allowed = 0;
        for i in 0..50 {
            let req = post_from("203.0.113.7", "/api/v1/auth/login")
                .insert_header(("X-Forwarded-For", format!("198.51.100.{i}")))
                .to_request();
            if call_service(&app, req).await.status() == StatusCode::OK {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 10);
    }

    #[actix_web::test]
    async fn test_trusted_proxy_keys_on_forwarded_for() {
        let app = init_service(
            App::new().service(
                web::scope("/api/v1/auth")
                    .wrap(RateLimit::new(limiter(auth_policy())).trust_proxy(true))
                    .route("/login", web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let from_client = |client: &str| {
            post_from("10.0.0.2", "/api/v1/auth/login")
                .insert_header(("X-Forwarded-For", client.to_string()))
                .to_request()
        };

        for _ in 0..10 {
            let resp = call_service(&app, from_client("198.51.100.1")).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        let resp = call_service(&app, from_client("198.51.100.1")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        // same proxy, different client behind it
        let resp = call_service(&app, from_client("198.51.100.2")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_api_scope_rejects_hundred_and_first_request() {
        let app = init_service(
            App::new().service(
                web::scope("/api/v1")
                    .wrap(RateLimit::new(limiter(api_policy())))
                    .route("/callbacks", web::post().to(HttpResponse::Created)),
            ),
        )
        .await;
        let callbacks = "/api/v1/callbacks";

        for _ in 0..100 {
            let resp = call_service(&app, post_from("198.51.100.1", callbacks).to_request()).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = call_service(&app, post_from("198.51.100.1", callbacks).to_request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(header(&resp, "ratelimit-policy"), "100;w=900");
        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Too many requests, calm down!" }));
    }
}
