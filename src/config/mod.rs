use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Public hosting and cache maintenance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishingConfig {
    /// Sites without a custom domain are served on `<subdomain>.<root_domain>`
    pub root_domain: String,
    pub revalidate_secret: String,
    pub revalidate_timeout_ms: u64,
    pub placeholder_image: String,
    /// Thumbnail proxy used for blurhash generation; `{url}` is replaced by the image URL
    pub image_proxy: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Some(v) = env::var("SITEPUB_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Publishing overrides
        if let Ok(v) = env::var("PUBLISH_ROOT_DOMAIN") {
            self.publishing.root_domain = v.trim().trim_start_matches('.').to_string();
        }
        if let Ok(v) = env::var("REVALIDATE_SECRET") {
            self.publishing.revalidate_secret = v;
        }
        if let Ok(v) = env::var("REVALIDATE_TIMEOUT_MS") {
            self.publishing.revalidate_timeout_ms = v.parse().unwrap_or(self.publishing.revalidate_timeout_ms);
        }
        if let Ok(v) = env::var("PLACEHOLDER_IMAGE") {
            self.publishing.placeholder_image = v;
        }
        if let Ok(v) = env::var("IMAGE_PROXY") {
            self.publishing.image_proxy = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                // Development only; staging and production must set JWT_SECRET
                jwt_secret: "sitepub-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            publishing: PublishingConfig {
                root_domain: "localhost:3000".to_string(),
                revalidate_secret: String::new(),
                revalidate_timeout_ms: 3000,
                placeholder_image: "/placeholder.png".to_string(),
                image_proxy: Self::DEFAULT_IMAGE_PROXY.to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            publishing: PublishingConfig {
                root_domain: "staging.vercel.pub".to_string(),
                revalidate_secret: String::new(),
                revalidate_timeout_ms: 3000,
                placeholder_image: "/placeholder.png".to_string(),
                image_proxy: Self::DEFAULT_IMAGE_PROXY.to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.vercel.pub".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            publishing: PublishingConfig {
                root_domain: "vercel.pub".to_string(),
                revalidate_secret: String::new(),
                revalidate_timeout_ms: 2000,
                placeholder_image: "/placeholder.png".to_string(),
                image_proxy: Self::DEFAULT_IMAGE_PROXY.to_string(),
            },
        }
    }

    const DEFAULT_IMAGE_PROXY: &'static str = "https://wsrv.nl/?url={url}&w=50&h=50&blur=5";
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.publishing.placeholder_image, "/placeholder.png");
        assert_eq!(config.publishing.revalidate_timeout_ms, 3000);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.publishing.root_domain, "vercel.pub");
        assert!(!config.database.enable_query_logging);
    }
}
