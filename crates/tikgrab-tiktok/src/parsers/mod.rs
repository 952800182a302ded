mod tiktok;

pub use tiktok::{is_tiktok_url, parse_tiktok_video_id};
