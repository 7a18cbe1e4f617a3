mod service;

pub use service::RetentionSweeper;
