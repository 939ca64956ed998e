use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub referral: ReferralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Read client addresses from `X-Forwarded-For` / `Forwarded`.
    /// Only enable behind a proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// Window and ceiling for one limiting policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyConfig {
    pub window_secs: u64,
    pub max_requests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_auth")]
    pub auth: PolicyConfig,
    #[serde(default = "RateLimitConfig::default_api")]
    pub api: PolicyConfig,
}

impl RateLimitConfig {
    fn default_auth() -> PolicyConfig {
        PolicyConfig {
            window_secs: 10 * 60,
            max_requests: 10,
        }
    }

    fn default_api() -> PolicyConfig {
        PolicyConfig {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth: Self::default_auth(),
            api: Self::default_api(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReferralConfig {
    /// Credited to the referrer's wallet (minor units) when a referred user signs up.
    #[serde(default)]
    pub bonus_amount: i64,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No file: build entirely from environment variables and defaults
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        cors_origins: Vec::new(),
                        trust_proxy: false,
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    rate_limit: RateLimitConfig::default(),
                    referral: ReferralConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables win over file values.
    fn apply_env_overrides(&mut self) {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = get_env("SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = p;
        }
        if let Some(v) = get_env("CORS_ALLOWED_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(b) = get_env("TRUST_PROXY").and_then(|v| v.parse().ok()) {
            self.server.trust_proxy = b;
        }
        if let Some(v) = get_env("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(mc) = get_env("DB_MAX_CONNECTIONS").and_then(|v| v.parse().ok()) {
            self.database.max_connections = mc;
        }
        if let Some(v) = get_env("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(n) = get_env("JWT_ACCESS_EXPIRES_IN").and_then(|v| v.parse().ok()) {
            self.jwt.access_token_expires_in = n;
        }
        if let Some(n) = get_env("JWT_REFRESH_EXPIRES_IN").and_then(|v| v.parse().ok()) {
            self.jwt.refresh_token_expires_in = n;
        }

        // Rate limiting
        if let Some(n) = get_env("RATE_LIMIT_AUTH_WINDOW_SECS").and_then(|v| v.parse().ok()) {
            self.rate_limit.auth.window_secs = n;
        }
        if let Some(n) = get_env("RATE_LIMIT_AUTH_MAX").and_then(|v| v.parse().ok()) {
            self.rate_limit.auth.max_requests = n;
        }
        if let Some(n) = get_env("RATE_LIMIT_API_WINDOW_SECS").and_then(|v| v.parse().ok()) {
            self.rate_limit.api.window_secs = n;
        }
        if let Some(n) = get_env("RATE_LIMIT_API_MAX").and_then(|v| v.parse().ok()) {
            self.rate_limit.api.max_requests = n;
        }

        if let Some(n) = get_env("REFERRAL_BONUS_AMOUNT").and_then(|v| v.parse().ok()) {
            self.referral.bonus_amount = n;
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults_when_section_missing() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/travel"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();

        assert_eq!(config.rate_limit.auth.window_secs, 600);
        assert_eq!(config.rate_limit.auth.max_requests, 10);
        assert_eq!(config.rate_limit.api.window_secs, 900);
        assert_eq!(config.rate_limit.api.max_requests, 100);
        assert_eq!(config.referral.bonus_amount, 0);
        assert!(!config.server.trust_proxy);
    }

    #[test]
    fn test_partial_rate_limit_section() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/travel"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [rate_limit.api]
            window_secs = 60
            max_requests = 5
        "#;
        let config: Config = toml::from_str(raw).unwrap();

        assert_eq!(config.rate_limit.api.max_requests, 5);
        assert_eq!(config.rate_limit.auth.max_requests, 10);
    }
}
