//! Clipshare API Library
//!
//! This crate provides the HTTP API handlers, auth middleware, share page
//! rendering, and application setup.

// Module declarations
mod api_doc;
mod handlers;
mod services;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::ErrorResponse;
