pub mod client;
pub mod errors;
pub mod types;
pub mod video_id;
