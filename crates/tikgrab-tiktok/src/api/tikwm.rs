use reqwest::Client;
use serde::Deserialize;
use tikgrab_core::{GrabError, GrabResult, retry_once};

const API_PATH: &str = "/api/";

#[derive(Debug, Clone)]
pub struct TikwmClient {
    client: Client,
    base_url: String,
}

impl TikwmClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_video(&self, url: &str) -> GrabResult<TikwmData> {
        let endpoint = format!("{}{API_PATH}", self.base_url);
        let form = [("url", url), ("hd", "1")];

        let response = retry_once(
            "tikwm",
            |err: &reqwest::Error| err.is_connect() || err.is_timeout(),
            || {
                self.client
                    .post(&endpoint)
                    .form(&form)
                    .header("Accept", "application/json")
                    .send()
            },
        )
        .await
        .map_err(|err| GrabError::ExtractionFailed(format!("tikwm request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GrabError::ExtractionFailed(format!(
                "tikwm error: status={status} body={body}"
            )));
        }

        let payload = response.json::<TikwmResponse>().await.map_err(|err| {
            GrabError::ExtractionFailed(format!("tikwm response parse failed: {err}"))
        })?;

        if payload.code != 0 {
            let message = payload
                .msg
                .filter(|msg| !msg.trim().is_empty())
                .unwrap_or_else(|| format!("tikwm returned code {}", payload.code));
            return Err(GrabError::ExtractionFailed(message));
        }

        payload
            .data
            .ok_or_else(|| GrabError::ExtractionFailed("tikwm response missing data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct TikwmResponse {
    pub code: i64,
    pub msg: Option<String>,
    pub data: Option<TikwmData>,
}

#[derive(Debug, Deserialize)]
pub struct TikwmData {
    pub id: Option<String>,
    pub title: Option<String>,
    pub play: Option<String>,
    pub wmplay: Option<String>,
    pub hdplay: Option<String>,
    pub music: Option<String>,
    pub images: Option<Vec<String>>,
    pub author: Option<TikwmAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct TikwmAuthor {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}
