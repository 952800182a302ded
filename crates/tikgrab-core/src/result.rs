use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::platform::Platform;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

/// Media URLs and metadata of a single TikTok post, as produced by the v3
/// extractor result shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "videoSD", skip_serializing_if = "Option::is_none")]
    pub video_sd: Option<String>,
    #[serde(rename = "videoHD", skip_serializing_if = "Option::is_none")]
    pub video_hd: Option<String>,
    #[serde(rename = "videoWatermark", skip_serializing_if = "Option::is_none")]
    pub video_watermark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoDetails {
    /// First available media URL, in SD, HD, watermarked, audio order.
    pub fn preview_source(&self) -> Option<&str> {
        self.video_sd
            .as_deref()
            .or(self.video_hd.as_deref())
            .or(self.video_watermark.as_deref())
            .or(self.music.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TikTokVideo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VideoDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DouyinVideo {
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

/// Successful answer of the download endpoint.
///
/// Serialized untagged so each variant keeps its historical body; use
/// [`DownloadResult::kind`] to branch on the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DownloadResult {
    TikTok(TikTokVideo),
    Douyin(DouyinVideo),
}

impl DownloadResult {
    pub fn kind(&self) -> Platform {
        match self {
            DownloadResult::TikTok(_) => Platform::TikTok,
            DownloadResult::Douyin(_) => Platform::Douyin,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_v3_shape() {
        let video: TikTokVideo = serde_json::from_value(json!({
            "status": "success",
            "result": {
                "type": "video",
                "author": { "avatar": "a.png", "nickname": "user" },
                "desc": "hello",
                "videoSD": "sd.mp4",
                "videoHD": "hd.mp4",
                "videoWatermark": "wm.mp4",
                "music": "m.mp3"
            }
        }))
        .unwrap();

        let details = video.result.unwrap();
        assert_eq!(details.kind.as_deref(), Some("video"));
        assert_eq!(details.video_sd.as_deref(), Some("sd.mp4"));
        assert_eq!(details.video_watermark.as_deref(), Some("wm.mp4"));
        assert_eq!(
            details.author.unwrap().nickname.as_deref(),
            Some("user")
        );
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "status": "success",
            "result": { "videoHD": "hd.mp4", "images": ["1.jpg"] },
            "provider": "tikwm"
        });
        let video: TikTokVideo = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&video).unwrap(), raw);
    }

    #[test]
    fn preview_source_follows_priority() {
        let mut details = VideoDetails {
            video_hd: Some("hd.mp4".into()),
            music: Some("m.mp3".into()),
            ..Default::default()
        };
        assert_eq!(details.preview_source(), Some("hd.mp4"));

        details.video_sd = Some("sd.mp4".into());
        assert_eq!(details.preview_source(), Some("sd.mp4"));

        details.video_sd = None;
        details.video_hd = None;
        assert_eq!(details.preview_source(), Some("m.mp3"));
    }

    #[test]
    fn douyin_result_serializes_without_tag() {
        let result = DownloadResult::Douyin(DouyinVideo {
            download_url: "c.mp4".into(),
        });
        assert_eq!(result.kind(), Platform::Douyin);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "downloadUrl": "c.mp4" })
        );
    }
}
