//! Core domain types for clipshare: configuration, error taxonomy, asset
//! models, principal/partition derivation, naming, and upload validation.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;
pub mod principal;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use principal::Principal;
