use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin visitors use to reach booking pages. Copy-link URLs are built from it.
    pub public_url: String,
    /// Front end origin allowed by CORS.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider that signs session tokens.
    pub jwt_secret: String,
    /// Hosted sign-in page of the identity provider.
    pub sign_in_url: String,
    /// Hosted sign-up page of the identity provider.
    pub sign_up_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for the public booking page
    pub booking_per_second: u32,
    /// Burst size for the public booking page
    pub booking_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                public_url: env::var("PUBLIC_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/calendarly.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            auth: AuthConfig {
                jwt_secret: env::var("AUTH_JWT_SECRET")
                    .map_err(|_| ConfigError::MissingEnv("AUTH_JWT_SECRET".to_string()))?,
                sign_in_url: env::var("AUTH_SIGN_IN_URL")
                    .unwrap_or_else(|_| "/sign-in".to_string()),
                sign_up_url: env::var("AUTH_SIGN_UP_URL")
                    .unwrap_or_else(|_| "/sign-up".to_string()),
            },
            rate_limit: RateLimitConfig {
                booking_per_second: env::var("RATE_LIMIT_BOOKING_PER_SECOND")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
                booking_burst: env::var("RATE_LIMIT_BOOKING_BURST")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .unwrap_or(20),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                public_url: "http://localhost:3000".to_string(),
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://data/calendarly.db".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                sign_in_url: "/sign-in".to_string(),
                sign_up_url: "/sign-up".to_string(),
            },
            rate_limit: RateLimitConfig {
                booking_per_second: 5,
                booking_burst: 20,
            },
        }
    }
}
