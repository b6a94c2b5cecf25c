//! Configuration module
//!
//! Configuration is read from the environment (optionally seeded from a `.env` file) and
//! validated once at startup. Handlers and services read it through the getters on `Config`.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const MAX_FILE_SIZE_MB: u64 = 100;
const MAX_FILES: usize = 10_000;
const MAX_TOTAL_SIZE_MB: u64 = 300;
const UPLOAD_CONCURRENCY: usize = 16;
const TRANSCODE_CONCURRENCY: usize = 2;
const BRIDGE_TTL_SECONDS: u64 = 300;
const DOWNLOAD_TTL_SECONDS: u64 = 60;
const TOKEN_RETENTION_SECONDS: u64 = 300;
const TOKEN_CLEANUP_INTERVAL_SECONDS: u64 = 30;

/// Hard ceiling on a single upload, regardless of `MAX_FILE_SIZE_MB`.
pub const MAX_FILE_SIZE_CEILING_MB: u64 = 100;

const MB: u64 = 1024 * 1024;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    /// Externally reachable origin used to build bridge and download links.
    pub base_url: String,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub log_format: String,
}

/// Registry, storage and token settings
#[derive(Clone, Debug)]
pub struct FileBridgeConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    // Registry limits
    pub max_file_size_bytes: u64,
    pub max_files: usize,
    pub max_total_size_bytes: u64,
    pub evict_oldest: bool,
    // Concurrency gates
    pub upload_concurrency: usize,
    pub transcode_concurrency: usize,
    // Token lifetimes
    pub bridge_ttl_seconds: u64,
    pub download_ttl_seconds: u64,
    /// How long an expired token is kept around (and reported as expired) before it is purged.
    pub token_retention_seconds: u64,
    pub token_cleanup_interval_seconds: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<FileBridgeConfig>);

impl Config {
    fn inner(&self) -> &FileBridgeConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = FileBridgeConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.inner().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn base_url(&self) -> &str {
        &self.inner().base.base_url
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().base.request_timeout_secs)
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.inner().max_file_size_bytes
    }

    pub fn max_files(&self) -> usize {
        self.inner().max_files
    }

    pub fn max_total_size_bytes(&self) -> u64 {
        self.inner().max_total_size_bytes
    }

    pub fn evict_oldest(&self) -> bool {
        self.inner().evict_oldest
    }

    pub fn upload_concurrency(&self) -> usize {
        self.inner().upload_concurrency
    }

    pub fn transcode_concurrency(&self) -> usize {
        self.inner().transcode_concurrency
    }

    pub fn bridge_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().bridge_ttl_seconds)
    }

    pub fn download_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().download_ttl_seconds)
    }

    pub fn token_retention(&self) -> Duration {
        Duration::from_secs(self.inner().token_retention_seconds)
    }

    pub fn token_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.inner().token_cleanup_interval_seconds)
    }
}

fn is_production_environment(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl FileBridgeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_environment(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base_url = match env::var("BASE_URL") {
            Ok(raw) => normalize_base_url(&raw)?,
            Err(_) => format!("http://localhost:{}", server_port),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        let base = BaseConfig {
            server_port,
            base_url,
            cors_origins,
            environment,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECONDS", REQUEST_TIMEOUT_SECS),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        };

        Ok(FileBridgeConfig {
            base,
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            max_file_size_bytes: env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB) * MB,
            max_files: env_or("MAX_FILES", MAX_FILES),
            max_total_size_bytes: env_or("MAX_TOTAL_SIZE_MB", MAX_TOTAL_SIZE_MB) * MB,
            evict_oldest: env_or("EVICT_OLDEST", true),
            upload_concurrency: env_or("UPLOAD_CONCURRENCY", UPLOAD_CONCURRENCY),
            transcode_concurrency: env_or("TRANSCODE_CONCURRENCY", TRANSCODE_CONCURRENCY),
            bridge_ttl_seconds: env_or("BRIDGE_TTL_SECONDS", BRIDGE_TTL_SECONDS),
            download_ttl_seconds: env_or("DOWNLOAD_TTL_SECONDS", DOWNLOAD_TTL_SECONDS),
            token_retention_seconds: env_or("TOKEN_RETENTION_SECONDS", TOKEN_RETENTION_SECONDS),
            token_cleanup_interval_seconds: env_or(
                "TOKEN_CLEANUP_INTERVAL_SECONDS",
                TOKEN_CLEANUP_INTERVAL_SECONDS,
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.max_file_size_bytes > MAX_FILE_SIZE_CEILING_MB * MB {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB must not exceed {}",
                MAX_FILE_SIZE_CEILING_MB
            ));
        }
        if self.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES must be greater than 0"));
        }
        if self.max_total_size_bytes < self.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_TOTAL_SIZE_MB must be at least MAX_FILE_SIZE_MB"
            ));
        }
        if self.upload_concurrency == 0 || self.transcode_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_CONCURRENCY and TRANSCODE_CONCURRENCY must be greater than 0"
            ));
        }
        if self.bridge_ttl_seconds == 0 || self.download_ttl_seconds == 0 {
            return Err(anyhow::anyhow!(
                "BRIDGE_TTL_SECONDS and DOWNLOAD_TTL_SECONDS must be greater than 0"
            ));
        }
        if self.token_cleanup_interval_seconds == 0 {
            return Err(anyhow::anyhow!(
                "TOKEN_CLEANUP_INTERVAL_SECONDS must be greater than 0"
            ));
        }
        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND=local"
            ));
        }
        normalize_base_url(&self.base.base_url)?;
        Ok(())
    }
}

/// Checks that `raw` is a bare http(s) origin and returns it without a trailing slash.
///
/// Paths, queries, fragments and userinfo are rejected: bridge links are built by appending
/// absolute paths to this value.
pub fn normalize_base_url(raw: &str) -> Result<String, anyhow::Error> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| anyhow::anyhow!("BASE_URL is not a valid URL: {}", e))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(anyhow::anyhow!("BASE_URL must use http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(anyhow::anyhow!("BASE_URL must include a host"));
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(anyhow::anyhow!("BASE_URL must not contain userinfo"));
    }
    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(anyhow::anyhow!(
            "BASE_URL must be an origin without path, query or fragment"
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
