use tikgrab_core::{DownloadResult, GrabError, GrabResult};
use url::Url;

/// Builds links to the external download proxy, which serves a media URL
/// as an attachment named `<title><type>`.
#[derive(Debug, Clone)]
pub struct ProxyTemplate {
    endpoint: Url,
}

impl ProxyTemplate {
    pub fn new(base: &str) -> GrabResult<Self> {
        let endpoint = Url::parse(base.trim_end_matches('/'))
            .and_then(|base| base.join("/api/download"))
            .map_err(|err| GrabError::Config(format!("invalid proxy base '{base}': {err}")))?;
        Ok(Self { endpoint })
    }

    pub fn link(&self, media_url: &str, extension: &str, title: &str) -> String {
        let mut link = self.endpoint.clone();
        link.query_pairs_mut()
            .append_pair("url", media_url)
            .append_pair("type", extension)
            .append_pair("title", title);
        link.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorView {
    pub avatar: String,
    pub nickname: String,
    pub avatar_download: Option<String>,
}

/// Everything the result block of the page shows for one resolved URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub author: Option<AuthorView>,
    pub preview: Option<String>,
    pub caption: Option<String>,
    pub links: Vec<DownloadLink>,
}

impl ResultView {
    pub fn build(result: &DownloadResult, proxy: &ProxyTemplate) -> Self {
        match result {
            DownloadResult::TikTok(video) => {
                let Some(details) = &video.result else {
                    return Self::empty();
                };
                let title = details
                    .author
                    .as_ref()
                    .and_then(|author| author.nickname.as_deref())
                    .unwrap_or_default();

                let author = details.author.as_ref().map(|author| AuthorView {
                    avatar: author.avatar.clone().unwrap_or_default(),
                    nickname: author.nickname.clone().unwrap_or_default(),
                    avatar_download: author
                        .avatar
                        .as_deref()
                        .map(|avatar| proxy.link(avatar, ".png", title)),
                });

                let variants = [
                    (&details.video_sd, "Download Video Low Without Watermark", ".mp4"),
                    (&details.video_hd, "Download Video HD Without Watermark", ".mp4"),
                    (&details.video_watermark, "Download Video With Watermark", ".mp4"),
                    (&details.music, "Download Audio Only", ".mp3"),
                ];
                let links = variants
                    .into_iter()
                    .filter_map(|(media, label, extension)| {
                        media.as_deref().map(|media| DownloadLink {
                            label,
                            href: proxy.link(media, extension, title),
                        })
                    })
                    .collect();

                Self {
                    author,
                    preview: details.preview_source().map(str::to_string),
                    caption: details.desc.clone(),
                    links,
                }
            }
            DownloadResult::Douyin(video) => Self {
                author: None,
                preview: Some(video.download_url.clone()),
                caption: None,
                links: vec![DownloadLink {
                    label: "Download Video",
                    href: proxy.link(&video.download_url, ".mp4", "douyin"),
                }],
            },
        }
    }

    fn empty() -> Self {
        Self {
            author: None,
            preview: None,
            caption: None,
            links: Vec::new(),
        }
    }
}
