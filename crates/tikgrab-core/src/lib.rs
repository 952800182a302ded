mod error;
mod platform;
mod result;
mod retry;

pub use error::{GrabError, GrabResult};
pub use platform::Platform;
pub use result::{Author, DouyinVideo, DownloadResult, TikTokVideo, VideoDetails};
pub use retry::retry_once;

/// Returns the trimmed URL, or `MissingInput` when nothing usable was given.
pub fn require_url(raw: Option<&str>) -> GrabResult<&str> {
    match raw.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(GrabError::MissingInput),
    }
}

pub fn validate_url(url: &str) -> GrabResult<()> {
    url::Url::parse(url).map_err(|err| GrabError::InvalidInput(format!("invalid url: {err}")))?;
    Ok(())
}
