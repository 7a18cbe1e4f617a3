//! Test helpers: build the router with a stub verifier chain so tests never
//! talk to a real identity provider.
//!
//! Run from workspace root: `cargo test -p clipshare-api`.

use async_trait::async_trait;
use axum_test::TestServer;
use clipshare_api::auth::{TokenVerifier, VerifiedProfile, VerifierChain};
use clipshare_api::setup::build_app;
use clipshare_core::{AppError, Config};
use clipshare_storage::PartitionStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Verifier that accepts a fixed set of tokens. "alice-token" and "bob-token"
/// map to allow-listed emails; "mallory-token" verifies fine but the email is
/// not on the allow-list.
pub struct StubVerifier {
    accounts: HashMap<String, String>,
}

impl StubVerifier {
    pub fn with_default_accounts() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert("alice-token".to_string(), "alice@example.com".to_string());
        accounts.insert("bob-token".to_string(), "bob@example.com".to_string());
        accounts.insert(
            "mallory-token".to_string(),
            "mallory@example.com".to_string(),
        );
        Self { accounts }
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn verify(&self, token: &str) -> Result<VerifiedProfile, AppError> {
        self.accounts
            .get(token)
            .map(|email| VerifiedProfile {
                email: email.clone(),
                name: None,
            })
            .ok_or_else(|| AppError::Unauthenticated("Unknown token".to_string()))
    }
}

pub fn test_config(storage_root: &std::path::Path) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        public_base_url: Some("https://clips.test".to_string()),
        storage_root: storage_root.to_path_buf(),
        allowed_emails: vec![
            "alice@example.com".to_string(),
            "bob@example.com".to_string(),
        ],
        max_video_size_bytes: 10 * 1024 * 1024,
        retention_window: Duration::from_secs(24 * 3600),
        sweep_interval: Duration::from_secs(3600),
        upload_timeout: Duration::from_secs(30),
        oauth_client_id: "test-client".to_string(),
        jwks_url: "https://idp.test/jwks".to_string(),
        userinfo_url: "https://idp.test/userinfo".to_string(),
        jwks_cache_ttl_secs: 3600,
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<PartitionStore>,
    pub _temp_dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with<F>(mutate: F) -> TestApp
where
    F: FnOnce(&mut Config),
{
    let temp_dir = TempDir::new().expect("create temp dir");
    let mut config = test_config(temp_dir.path());
    mutate(&mut config);

    let store = Arc::new(
        PartitionStore::new(config.storage_root.clone())
            .await
            .expect("init store"),
    );
    let verifier = Arc::new(VerifierChain::new(vec![Arc::new(
        StubVerifier::with_default_accounts(),
    )]));

    let (_state, router) = build_app(config, store.clone(), verifier).expect("build app");
    let server = TestServer::new(router).expect("start test server");

    TestApp {
        server,
        store,
        _temp_dir: temp_dir,
    }
}
