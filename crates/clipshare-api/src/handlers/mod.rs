pub mod health;
pub mod share_page;
pub mod video_delete;
pub mod video_list;
pub mod video_stream;
pub mod video_upload;
