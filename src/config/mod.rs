use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    /// Hard transport limit; requests above it never reach a handler.
    pub max_request_size_bytes: usize,
    /// Largest file the blob endpoint forwards to object storage.
    pub max_upload_bytes: usize,
    /// Number of entries kept in the activity feed.
    pub feed_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub login_route: String,
    pub owner_email: String,
    /// Lowercase hex SHA-256 of the owner password.
    pub owner_password_sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Postgres URL for the document store. Unset means in-memory documents.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub blob_dir: String,
    pub blob_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub api_base: String,
    /// `owner/name`. Unset disables the commit source of the activity feed.
    pub repository: Option<String>,
    pub token: Option<String>,
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
        // API overrides
        if let Some(v) = env::var("FOLIO_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }
        if let Ok(v) = env::var("API_FEED_LIMIT") {
            self.api.feed_limit = v.parse().unwrap_or(self.api.feed_limit);
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
        if let Ok(v) = env::var("SECURITY_LOGIN_ROUTE") {
            self.security.login_route = v;
        }
        if let Ok(v) = env::var("OWNER_EMAIL") {
            self.security.owner_email = v;
        }
        if let Ok(v) = env::var("OWNER_PASSWORD_SHA256") {
            self.security.owner_password_sha256 = v.to_lowercase();
        }

        // Storage overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.storage.database_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.storage.max_connections = v.parse().unwrap_or(self.storage.max_connections);
        }
        if let Ok(v) = env::var("BLOB_DIR") {
            self.storage.blob_dir = v;
        }
        if let Ok(v) = env::var("BLOB_BASE_URL") {
            self.storage.blob_base_url = v.trim_end_matches('/').to_string();
        }

        // GitHub overrides
        if let Ok(v) = env::var("GITHUB_API_BASE") {
            self.github.api_base = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("GITHUB_REPOSITORY") {
            self.github.repository = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("GITHUB_TOKEN") {
            self.github.token = Some(v).filter(|s| !s.is_empty());
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                max_upload_bytes: 5 * 1024 * 1024,        // 5MB
                feed_limit: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                login_route: "/login".to_string(),
                owner_email: "owner@localhost".to_string(),
                // sha256("password")
                owner_password_sha256: "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8".to_string(),
            },
            storage: StorageConfig {
                database_url: None,
                max_connections: 5,
                blob_dir: "./blobs".to_string(),
                blob_base_url: "http://localhost:3000/files".to_string(),
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                repository: None,
                token: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024,
                max_upload_bytes: 5 * 1024 * 1024,
                feed_limit: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                login_route: "/login".to_string(),
                owner_email: String::new(),
                owner_password_sha256: String::new(),
            },
            storage: StorageConfig {
                database_url: None,
                max_connections: 10,
                blob_dir: "/var/lib/folio/blobs".to_string(),
                blob_base_url: "https://staging.example.com/files".to_string(),
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                repository: None,
                token: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                max_request_size_bytes: 6 * 1024 * 1024,
                max_upload_bytes: 5 * 1024 * 1024,
                feed_limit: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                login_route: "/login".to_string(),
                owner_email: String::new(),
                owner_password_sha256: String::new(),
            },
            storage: StorageConfig {
                database_url: None,
                max_connections: 20,
                blob_dir: "/var/lib/folio/blobs".to_string(),
                blob_base_url: "https://app.example.com/files".to_string(),
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                repository: None,
                token: None,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.max_upload_bytes, 5_242_880);
        assert_eq!(config.api.feed_limit, 10);
        assert!(config.storage.database_url.is_none());
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.api.max_request_size_bytes > config.api.max_upload_bytes);
        assert_eq!(config.security.login_route, "/login");
    }
}
