//! Configuration module
//!
//! Process-wide configuration loaded once from the environment at startup and
//! treated as immutable thereafter. `validate()` fails fast on
//! misconfiguration; an empty allow-list is a hard error, never an
//! open-access default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_VIDEO_SIZE_MB: usize = 500;
const DEFAULT_RETENTION_HOURS: u64 = 24;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 600;
const DEFAULT_JWKS_CACHE_TTL_SECS: i64 = 3600;
const DEFAULT_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Externally visible base URL, e.g. "https://clips.example". When unset,
    /// the base URL is derived per request from forwarding headers.
    pub public_base_url: Option<String>,
    /// Root directory under which per-principal partitions live.
    pub storage_root: PathBuf,
    /// Emails allowed to upload. Loaded once; empty is a configuration error.
    pub allowed_emails: Vec<String>,
    pub max_video_size_bytes: usize,
    pub retention_window: Duration,
    pub sweep_interval: Duration,
    pub upload_timeout: Duration,
    /// Expected audience (OAuth client id) for signed ID tokens.
    pub oauth_client_id: String,
    pub jwks_url: String,
    pub userinfo_url: String,
    pub jwks_cache_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let allowed_emails = env::var("ALLOWED_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_VIDEO_SIZE_MB);

        let retention_hours = env::var("RETENTION_HOURS")
            .unwrap_or_else(|_| DEFAULT_RETENTION_HOURS.to_string())
            .parse::<u64>()
            .unwrap_or(DEFAULT_RETENTION_HOURS);

        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

        let upload_timeout_secs = env::var("UPLOAD_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|s| s.trim_end_matches('/').to_string()),
            storage_root: env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "./uploads".to_string())
                .into(),
            allowed_emails,
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            retention_window: Duration::from_secs(retention_hours * 3600),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            oauth_client_id: env::var("OAUTH_CLIENT_ID").unwrap_or_default(),
            jwks_url: env::var("OAUTH_JWKS_URL").unwrap_or_else(|_| DEFAULT_JWKS_URL.to_string()),
            userinfo_url: env::var("OAUTH_USERINFO_URL")
                .unwrap_or_else(|_| DEFAULT_USERINFO_URL.to_string()),
            jwks_cache_ttl_secs: DEFAULT_JWKS_CACHE_TTL_SECS,
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.allowed_emails.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EMAILS is empty; refusing to start with an open allow-list"
            ));
        }
        if self.oauth_client_id.is_empty() {
            return Err(anyhow::anyhow!(
                "OAUTH_CLIENT_ID must be set for ID token verification"
            ));
        }
        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than 0"));
        }
        if self.is_production() && self.cors_origins.contains(&"*".to_string()) {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            public_base_url: None,
            storage_root: "/tmp/clipshare".into(),
            allowed_emails: vec!["alice@example.com".to_string()],
            max_video_size_bytes: 500 * 1024 * 1024,
            retention_window: Duration::from_secs(24 * 3600),
            sweep_interval: Duration::from_secs(3600),
            upload_timeout: Duration::from_secs(600),
            oauth_client_id: "client-id".to_string(),
            jwks_url: DEFAULT_JWKS_URL.to_string(),
            userinfo_url: DEFAULT_USERINFO_URL.to_string(),
            jwks_cache_ttl_secs: 3600,
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_empty_allow_list_is_rejected() {
        let mut config = base_config();
        config.allowed_emails.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_rejects_wildcard_cors() {
        let mut config = base_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());
        config.cors_origins = vec!["https://clips.example".to_string()];
        assert!(config.validate().is_ok());
        assert!(config.is_production());
    }
}
