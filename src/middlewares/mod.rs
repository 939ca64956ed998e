pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod rate_limit;

pub use auth::{AuthMiddleware, AuthUser, current_user, require_admin, require_staff};
pub use client_ip::{TrustProxy, client_ip};
pub use cors::create_cors;
pub use rate_limit::{RateLimit, RateLimitPolicy, RateLimiter};
