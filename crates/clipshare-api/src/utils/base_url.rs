//! External base URL reconstruction
//!
//! Upload and catalog responses embed absolute URLs. When `PUBLIC_BASE_URL`
//! is set it wins; otherwise the base is rebuilt from forwarded headers so
//! links stay correct behind a reverse proxy.

use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header::HOST, request::Parts, HeaderMap};
use clipshare_core::Config;
use std::convert::Infallible;
use std::sync::Arc;

/// The externally visible base URL for the current request, without a
/// trailing slash.
#[derive(Debug, Clone)]
pub struct RequestBaseUrl(pub String);

impl FromRequestParts<Arc<AppState>> for RequestBaseUrl {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestBaseUrl(external_base_url(
            &parts.headers,
            &state.config,
        )))
    }
}

pub fn external_base_url(headers: &HeaderMap, config: &Config) -> String {
    if let Some(base) = &config.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    // x-forwarded-* may carry a comma-separated chain; the first entry is
    // the client-facing edge.
    let forwarded_proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let scheme = match forwarded_proto {
        Some(proto) if !proto.is_empty() => proto,
        _ if config.is_production() => "https".to_string(),
        _ => "http".to_string(),
    };

    let host = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        })
        .unwrap_or_else(|| format!("localhost:{}", config.server_port));

    format!("{}://{}", scheme, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_config() -> Config {
        Config {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            public_base_url: None,
            storage_root: "/tmp/clipshare".into(),
            allowed_emails: vec!["alice@example.com".to_string()],
            max_video_size_bytes: 500 * 1024 * 1024,
            retention_window: std::time::Duration::from_secs(24 * 3600),
            sweep_interval: std::time::Duration::from_secs(3600),
            upload_timeout: std::time::Duration::from_secs(600),
            oauth_client_id: "client-id".to_string(),
            jwks_url: "https://www.googleapis.com/oauth2/v3/certs".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            jwks_cache_ttl_secs: 3600,
        }
    }

    #[test]
    fn test_public_base_url_wins() {
        let mut config = test_config();
        config.public_base_url = Some("https://clips.example.com/".to_string());
        let headers = HeaderMap::new();
        assert_eq!(
            external_base_url(&headers, &config),
            "https://clips.example.com"
        );
    }

    #[test]
    fn test_forwarded_headers_rebuild_base() {
        let config = test_config();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-proto",
            HeaderValue::from_static("https, http"),
        );
        headers.insert(
            "x-forwarded-host",
            HeaderValue::from_static("clips.example.com"),
        );
        assert_eq!(
            external_base_url(&headers, &config),
            "https://clips.example.com"
        );
    }

    #[test]
    fn test_host_header_fallback() {
        let config = test_config();
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:8080"));
        assert_eq!(external_base_url(&headers, &config), "http://localhost:8080");
    }

    #[test]
    fn test_no_headers_uses_configured_port() {
        let mut config = test_config();
        config.server_port = 9000;
        let headers = HeaderMap::new();
        assert_eq!(external_base_url(&headers, &config), "http://localhost:9000");
    }
}
