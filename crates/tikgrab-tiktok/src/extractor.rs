use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tikgrab_core::{Author, GrabError, GrabResult, TikTokVideo, VideoDetails};

use crate::api::tikwm::{TikwmClient, TikwmData};
use crate::parsers::{is_tiktok_url, parse_tiktok_video_id};

/// Result layout requested from an extractor. Only the v3 layout
/// (`videoSD` / `videoHD` / `videoWatermark` / `music`) is produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorVersion {
    V1,
    V2,
    #[default]
    V3,
}

impl fmt::Display for ExtractorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
            Self::V3 => write!(f, "v3"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub version: ExtractorVersion,
}

/// Turns a TikTok page URL into direct media URLs.
#[async_trait]
pub trait VideoExtractor: Send + Sync {
    async fn extract(&self, url: &str, options: &ExtractOptions) -> GrabResult<TikTokVideo>;
}

/// Extractor backed by the public tikwm resolver.
#[derive(Debug, Clone)]
pub struct TikwmExtractor {
    client: TikwmClient,
}

impl TikwmExtractor {
    pub fn new(base_url: &str, timeout: Duration) -> GrabResult<Self> {
        let client = Client::builder()
            .user_agent("tikgrab/0.1")
            .timeout(timeout)
            .build()
            .map_err(|err| GrabError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self::with_client(TikwmClient::new(client, base_url)))
    }

    pub fn with_client(client: TikwmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VideoExtractor for TikwmExtractor {
    async fn extract(&self, url: &str, options: &ExtractOptions) -> GrabResult<TikTokVideo> {
        if options.version != ExtractorVersion::V3 {
            return Err(GrabError::ExtractionFailed(format!(
                "extractor version {} is not supported",
                options.version
            )));
        }
        if !is_tiktok_url(url) {
            return Err(GrabError::ExtractionFailed(format!(
                "not a TikTok url: {url}"
            )));
        }

        tracing::debug!(
            url,
            video_id = parse_tiktok_video_id(url).as_deref().unwrap_or("short-link"),
            "resolving tiktok video"
        );
        let data = self.client.fetch_video(url).await?;
        tracing::debug!(id = data.id.as_deref().unwrap_or_default(), "tikwm resolved video");
        Ok(to_v3(data, self.client.base_url()))
    }
}

fn to_v3(data: TikwmData, base_url: &str) -> TikTokVideo {
    let absolute = |value: Option<String>| value.map(|link| absolutize(base_url, link));

    let mut extra = Map::new();
    let kind = match data.images {
        Some(images) if !images.is_empty() => {
            let images: Vec<String> = images
                .into_iter()
                .map(|img| absolutize(base_url, img))
                .collect();
            extra.insert("images".to_string(), Value::from(images));
            "image"
        }
        _ => "video",
    };

    let details = VideoDetails {
        kind: Some(kind.to_string()),
        author: data.author.map(|author| Author {
            avatar: absolute(author.avatar),
            nickname: author.nickname,
        }),
        desc: data.title,
        video_sd: absolute(data.play),
        video_hd: absolute(data.hdplay),
        video_watermark: absolute(data.wmplay),
        music: absolute(data.music),
        extra,
    };

    TikTokVideo {
        status: Some("success".to_string()),
        message: None,
        result: Some(details),
        extra: Map::new(),
    }
}

/// tikwm answers some media links relative to its own host.
fn absolutize(base_url: &str, link: String) -> String {
    if link.starts_with('/') {
        format!("{base_url}{link}")
    } else {
        link
    }
}
