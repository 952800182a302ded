use serde::{Deserialize, Serialize};

pub const DEFAULT_APIFY_ENDPOINT: &str =
    "https://api.apify.com/v2/acts/douyin-video-downloader/run-sync";
pub const DEFAULT_TIKWM_BASE: &str = "https://www.tikwm.com";
pub const DEFAULT_BIND: &str = "127.0.0.1:4321";
pub const DEFAULT_PROXY_BASE: &str = "https://dl.vid3konline.workers.dev";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    pub apify_token: Option<String>,
    pub apify_endpoint: Option<String>,
    pub tikwm_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub proxy_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TikgrabConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
}
