//! Configuration module
//!
//! Settings are read once from the environment (with `.env` support) and then
//! validated, so the process fails fast on a broken deployment.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const STORAGE_CONCURRENCY: usize = 16;
const PUSH_TIMEOUT_SECS: u64 = 30;
const PUSH_TTL_SECS: u64 = 86_400;
const PUSH_MAX_CONCURRENT: usize = 50;
const DEFAULT_AUDIO_CONTENT_TYPES: &str = "audio/mp3,audio/mpeg3,audio/x-mpeg-3,audio/mpeg";
const DEFAULT_IMAGE_CONTENT_TYPES: &str = "image/jpg,image/jpeg,image/png";

/// Process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Full service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    /// First of `S3_REGION`, `AWS_BUCKET_REGION`, `AWS_REGION`
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // MinIO, DigitalOcean Spaces, ...
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload handling
    pub upload_staging_dir: PathBuf,
    pub max_upload_size_bytes: usize,
    pub audio_content_types: Vec<String>,
    pub image_content_types: Vec<String>,
    pub storage_concurrency: usize,
    pub public_base_url: String,
    // Web push
    pub web_push_public_key: Option<String>,
    pub web_push_private_key: Option<String>,
    pub web_push_mail_id: Option<String>,
    pub push_timeout_seconds: u64,
    pub push_ttl_seconds: u64,
    pub push_max_concurrent: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn is_production(&self) -> bool {
        is_production(&self.inner().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn upload_staging_dir(&self) -> &PathBuf {
        &self.inner().upload_staging_dir
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn audio_content_types(&self) -> &[String] {
        &self.inner().audio_content_types
    }

    pub fn image_content_types(&self) -> &[String] {
        &self.inner().image_content_types
    }

    pub fn storage_concurrency(&self) -> usize {
        self.inner().storage_concurrency
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    pub fn web_push_public_key(&self) -> Option<&str> {
        self.inner().web_push_public_key.as_deref()
    }

    pub fn web_push_private_key(&self) -> Option<&str> {
        self.inner().web_push_private_key.as_deref()
    }

    pub fn web_push_mail_id(&self) -> Option<&str> {
        self.inner().web_push_mail_id.as_deref()
    }

    pub fn push_timeout_seconds(&self) -> u64 {
        self.inner().push_timeout_seconds
    }

    pub fn push_ttl_seconds(&self) -> u64 {
        self.inner().push_ttl_seconds
    }

    pub fn push_max_concurrent(&self) -> usize {
        self.inner().push_max_concurrent
    }
}

fn is_production(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = match optional_var("STORAGE_BACKEND") {
            Some(raw) => Some(raw.parse::<StorageBackend>()?),
            None => None,
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let upload_staging_dir = optional_var("UPLOAD_STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("cadenza-staging"));

        Ok(ServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: optional_var("S3_BUCKET").or_else(|| optional_var("AWS_BUCKET_NAME")),
            s3_region: optional_var("S3_REGION")
                .or_else(|| optional_var("AWS_BUCKET_REGION"))
                .or_else(|| optional_var("AWS_REGION")),
            s3_endpoint: optional_var("S3_ENDPOINT"),
            local_storage_path: optional_var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: optional_var("LOCAL_STORAGE_BASE_URL"),
            upload_staging_dir,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            audio_content_types: csv_list(
                &env::var("AUDIO_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_AUDIO_CONTENT_TYPES.to_string()),
            ),
            image_content_types: csv_list(
                &env::var("IMAGE_CONTENT_TYPES")
                    .unwrap_or_else(|_| DEFAULT_IMAGE_CONTENT_TYPES.to_string()),
            ),
            storage_concurrency: env::var("STORAGE_CONCURRENCY")
                .unwrap_or_else(|_| STORAGE_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(STORAGE_CONCURRENCY),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", SERVER_PORT)),
            web_push_public_key: optional_var("WEB_PUSH_PUBLIC_KEY"),
            web_push_private_key: optional_var("WEB_PUSH_PRIVATE_KEY"),
            web_push_mail_id: optional_var("WEB_PUSH_MAIL_ID"),
            push_timeout_seconds: env::var("PUSH_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| PUSH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PUSH_TIMEOUT_SECS),
            push_ttl_seconds: env::var("PUSH_TTL_SECONDS")
                .unwrap_or_else(|_| PUSH_TTL_SECS.to_string())
                .parse()
                .unwrap_or(PUSH_TTL_SECS),
            push_max_concurrent: env::var("PUSH_MAX_CONCURRENT")
                .unwrap_or_else(|_| PUSH_MAX_CONCURRENT.to_string())
                .parse()
                .unwrap_or(PUSH_MAX_CONCURRENT),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.storage_concurrency == 0 || self.push_max_concurrent == 0 {
            return Err(anyhow::anyhow!(
                "STORAGE_CONCURRENCY and PUSH_MAX_CONCURRENT must be greater than zero"
            ));
        }

        match self.storage_backend.unwrap_or(StorageBackend::S3) {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.web_push_public_key.is_some() != self.web_push_private_key.is_some() {
            return Err(anyhow::anyhow!(
                "WEB_PUSH_PUBLIC_KEY and WEB_PUSH_PRIVATE_KEY must be set together"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ServiceConfig {
        ServiceConfig {
            base: BaseConfig {
                server_port: 5000,
                cors_origins: vec!["*".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 5,
                environment: "test".to_string(),
            },
            database_url: "postgres://localhost/cadenza".to_string(),
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/cadenza".to_string()),
            local_storage_base_url: Some("http://localhost:5000/media".to_string()),
            upload_staging_dir: PathBuf::from("/tmp/cadenza-staging"),
            max_upload_size_bytes: 1024,
            audio_content_types: csv_list(DEFAULT_AUDIO_CONTENT_TYPES),
            image_content_types: csv_list(DEFAULT_IMAGE_CONTENT_TYPES),
            storage_concurrency: 4,
            public_base_url: "http://localhost:5000".to_string(),
            web_push_public_key: None,
            web_push_private_key: None,
            web_push_mail_id: None,
            push_timeout_seconds: 5,
            push_ttl_seconds: 60,
            push_max_concurrent: 4,
        }
    }

    #[test]
    fn local_backend_requires_path_and_url() {
        assert!(local_config().validate().is_ok());

        let mut config = local_config();
        config.local_storage_path = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let mut config = local_config();
        config.storage_backend = None;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("tracks".to_string());
        assert!(config.validate().is_err());

        config.s3_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(Config(Box::new(config)).s3_region(), Some("eu-west-1"));
    }

    #[test]
    fn vapid_keys_come_in_pairs() {
        let mut config = local_config();
        config.web_push_public_key = Some("BPub".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_postgres_url() {
        let mut config = local_config();
        config.database_url = "mysql://localhost/cadenza".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn csv_list_normalizes_entries() {
        assert_eq!(
            csv_list(" Image/PNG, ,image/jpeg "),
            vec!["image/png".to_string(), "image/jpeg".to_string()]
        );
    }
}
