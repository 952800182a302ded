use std::sync::Arc;

use tikgrab_core::{DownloadResult, GrabResult, Platform, require_url};
use tikgrab_douyin::DouyinClient;
use tikgrab_tiktok::{ExtractOptions, ExtractorVersion, VideoExtractor};

/// Resolves a pasted video URL into direct media links.
///
/// Every call performs exactly one upstream resolution; nothing is cached
/// between calls.
#[derive(Clone)]
pub struct DownloadHandler {
    extractor: Arc<dyn VideoExtractor>,
    douyin: DouyinClient,
}

impl DownloadHandler {
    pub fn new(extractor: Arc<dyn VideoExtractor>, douyin: DouyinClient) -> Self {
        Self { extractor, douyin }
    }

    pub async fn handle(
        &self,
        raw_url: Option<&str>,
        platform: Option<Platform>,
    ) -> GrabResult<DownloadResult> {
        let url = require_url(raw_url)?;
        let platform = Platform::resolve(url, platform);
        tracing::info!(url, %platform, "resolving download");

        let result = match platform {
            Platform::Douyin => self.douyin.resolve(url).await.map(DownloadResult::Douyin),
            Platform::TikTok => {
                let options = ExtractOptions {
                    version: ExtractorVersion::V3,
                };
                self.extractor
                    .extract(url, &options)
                    .await
                    .map(DownloadResult::TikTok)
            }
        };

        if let Err(err) = &result {
            tracing::warn!(url, %platform, error = %err, "download resolution failed");
        }
        result
    }
}
