//! Filesystem partition store for clipshare.
//!
//! The filesystem is the record store: one directory per principal
//! (partition), one file per video asset. All concurrency safety comes from
//! filesystem-atomic operations; there are no in-process locks.

mod error;
mod local;

pub use error::{StorageError, StorageResult};
pub use local::{PartitionStore, SweepStats};
