/// Configuration management for the Nexus Portal backend
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub artifact: Option<ArtifactStoreConfig>,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL used in certificate verification links
    pub public_url: String,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database_path: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Secret mixed into certificate id checksums to deter guessing
    pub cert_signing_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl: i64,
}

/// External artifact host configuration.
///
/// All fields come from one credential group; when the group is absent the
/// server runs without an artifact store and certificates issue with no
/// hosted artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactStoreConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub endpoint: Option<String>,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub authenticated_rps: u32,
    pub unauthenticated_rps: u32,
    pub burst_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("NEXUS_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("NEXUS_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;

        let public_url = env::var("NEXUS_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let version = env::var("NEXUS_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("NEXUS_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database_path = env::var("NEXUS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("nexus.sqlite"));

        let jwt_secret = env::var("NEXUS_JWT_SECRET")
            .map_err(|_| ApiError::Validation("JWT secret required".to_string()))?;
        let cert_signing_secret = env::var("NEXUS_CERT_SIGNING_SECRET")
            .map_err(|_| ApiError::Validation("Certificate signing secret required".to_string()))?;
        let access_token_ttl = env::var("NEXUS_ACCESS_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);

        // Artifact host credentials are optional as a group. Without them the
        // server still issues certificates, just without a hosted artifact.
        let artifact = match (
            env::var("NEXUS_ARTIFACT_CLOUD_NAME"),
            env::var("NEXUS_ARTIFACT_API_KEY"),
            env::var("NEXUS_ARTIFACT_API_SECRET"),
        ) {
            (Ok(cloud_name), Ok(api_key), Ok(api_secret)) => Some(ArtifactStoreConfig {
                cloud_name,
                api_key,
                api_secret,
                endpoint: env::var("NEXUS_ARTIFACT_ENDPOINT").ok(),
            }),
            _ => None,
        };

        let rate_limit_enabled = env::var("NEXUS_RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let authenticated_rps = env::var("NEXUS_RATE_LIMIT_AUTHENTICATED_RPS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);
        let unauthenticated_rps = env::var("NEXUS_RATE_LIMIT_UNAUTHENTICATED_RPS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let burst_size = env::var("NEXUS_RATE_LIMIT_BURST_SIZE")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .unwrap_or(50);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database_path,
            },
            authentication: AuthConfig {
                jwt_secret,
                cert_signing_secret,
                access_token_ttl,
            },
            artifact,
            rate_limit: RateLimitConfig {
                enabled: rate_limit_enabled,
                authenticated_rps,
                unauthenticated_rps,
                burst_size,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(ApiError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.cert_signing_secret.is_empty() {
            return Err(ApiError::Validation(
                "Certificate signing secret cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
