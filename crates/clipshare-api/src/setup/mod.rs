//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs so integration
//! tests can assemble the router with their own config and verifier chain.

pub mod routes;
pub mod server;

use crate::auth::{AccessPolicy, AuthState, VerifierChain};
use crate::state::AppState;
use anyhow::{Context, Result};
use clipshare_core::Config;
use clipshare_services::RetentionSweeper;
use clipshare_storage::PartitionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Initialize the entire application from config.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    let store = Arc::new(
        PartitionStore::new(config.storage_root.clone())
            .await
            .context("Failed to initialize storage root")?,
    );

    let verifier = Arc::new(VerifierChain::for_config(&config));

    tracing::info!(
        storage_root = %config.storage_root.display(),
        allowed_emails = config.allowed_emails.len(),
        "Configuration loaded and validated"
    );

    build_app(config, store, verifier)
}

/// Assemble state and router from already-built parts. Integration tests use
/// this directly with a stub verifier chain.
pub fn build_app(
    config: Config,
    store: Arc<PartitionStore>,
    verifier: Arc<VerifierChain>,
) -> Result<(Arc<AppState>, axum::Router)> {
    let policy = AccessPolicy::new(&config.allowed_emails);
    let auth_state = AuthState { verifier, policy };

    let state = Arc::new(AppState {
        config,
        store: store.clone(),
    });

    let router = routes::setup_routes(state.clone(), auth_state)?;
    Ok((state, router))
}

/// Spawn the background retention sweeper for the app's store.
pub fn start_retention_sweeper(state: &Arc<AppState>) -> JoinHandle<()> {
    let sweeper = Arc::new(RetentionSweeper::new(
        state.store.clone(),
        state.config.retention_window,
        state.config.sweep_interval,
    ));
    sweeper.start()
}
