//! Background services for clipshare.

pub mod retention;

pub use retention::RetentionSweeper;
