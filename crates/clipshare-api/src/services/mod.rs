pub mod share;
pub mod upload;
