pub mod video;

pub use video::{VideoAsset, VideoResponse};
