/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT secret, Cookie 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub cache_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // HMAC signing secret. Read once here, handed to TokenProvider by value and
    // never touched again (no mutable global).
    pub jwt_secret: String,

    pub cookie_domain: String,
    pub cookie_secure: bool,

    // Base URL prepended to /exception redirects when the request host is not
    // localhost. Ex: https://api.kukemeet.com
    pub public_base_url: String,

    pub user_cache_ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let cache_url =
            std::env::var("CACHE_URL").map_err(|_| ConfigError::Missing("CACHE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let cookie_domain = std::env::var("COOKIE_DOMAIN").unwrap_or_default();

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        // Secure cookies are scoped to a domain; require one when enabled.
        if cookie_secure && cookie_domain.trim().is_empty() {
            return Err(ConfigError::Missing("COOKIE_DOMAIN"));
        }

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.kukemeet.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let user_cache_ttl_seconds = std::env::var("USER_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3600);

        Ok(Self {
            addr,
            database_url,
            cache_url,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            cookie_domain,
            cookie_secure,
            public_base_url,
            user_cache_ttl_seconds,
        })
    }
}
