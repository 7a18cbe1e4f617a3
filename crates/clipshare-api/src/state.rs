//! Shared application state.
//!
//! Constructed once during initialization and treated as immutable; request
//! handlers share it through an `Arc` and keep no mutable state of their own.

use clipshare_core::Config;
use clipshare_storage::PartitionStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: Arc<PartitionStore>,
}
