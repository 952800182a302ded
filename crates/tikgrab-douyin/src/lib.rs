use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tikgrab_core::{DouyinVideo, GrabError, GrabResult, retry_once};

/// Client for the Apify actor that scrapes Douyin video pages.
#[derive(Debug, Clone)]
pub struct DouyinClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl DouyinClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> GrabResult<Self> {
        let client = Client::builder()
            .user_agent("tikgrab/0.1")
            .timeout(timeout)
            .build()
            .map_err(|err| GrabError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self::with_client(client, endpoint, token))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }

    pub async fn resolve(&self, url: &str) -> GrabResult<DouyinVideo> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| GrabError::Config("Apify API token is not configured".to_string()))?;

        let body = RunRequest {
            input: RunInput { url },
        };

        let response = retry_once(
            "apify",
            |err: &reqwest::Error| err.is_connect() || err.is_timeout(),
            || {
                self.client
                    .post(&self.endpoint)
                    .bearer_auth(token)
                    .json(&body)
                    .send()
            },
        )
        .await
        .map_err(|err| {
            GrabError::UpstreamRequestFailed(format!("Apify API request failed: {err}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "apify answered with an error status");
            return Err(GrabError::UpstreamRequestFailed(format!(
                "Apify API request failed: status={status} body={body}"
            )));
        }

        // Any JSON is accepted here; a body without a usable first item is an empty result.
        let payload = response.json::<Value>().await.map_err(|err| {
            GrabError::UpstreamRequestFailed(format!("Apify response parse failed: {err}"))
        })?;

        match first_download_url(&payload) {
            Some(download_url) => Ok(DouyinVideo { download_url }),
            None => {
                tracing::debug!(%payload, "apify run produced no download url");
                Err(GrabError::UpstreamEmptyResult)
            }
        }
    }
}

fn first_download_url(payload: &Value) -> Option<String> {
    payload
        .get("items")?
        .as_array()?
        .first()?
        .get("downloadUrl")?
        .as_str()
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    input: RunInput<'a>,
}

#[derive(Debug, Serialize)]
struct RunInput<'a> {
    url: &'a str,
}
