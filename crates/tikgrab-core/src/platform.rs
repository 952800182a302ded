use std::fmt;
use std::str::FromStr;

use crate::error::GrabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    TikTok,
    Douyin,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Douyin => "douyin",
        }
    }

    /// Infers the platform from the URL text alone.
    pub fn classify(url: &str) -> Self {
        if url.contains("douyin.com") {
            Platform::Douyin
        } else {
            Platform::TikTok
        }
    }

    /// An explicit choice wins over URL sniffing.
    pub fn resolve(url: &str, explicit: Option<Platform>) -> Self {
        explicit.unwrap_or_else(|| Self::classify(url))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = GrabError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "tiktok" | "tik-tok" | "tik_tok" => Ok(Platform::TikTok),
            "douyin" => Ok(Platform::Douyin),
            other => Err(GrabError::InvalidInput(format!("unknown platform: {other}"))),
        }
    }
}
