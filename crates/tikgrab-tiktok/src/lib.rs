pub mod api;
mod extractor;
mod parsers;

pub use extractor::{ExtractOptions, ExtractorVersion, TikwmExtractor, VideoExtractor};
pub use parsers::{is_tiktok_url, parse_tiktok_video_id};
