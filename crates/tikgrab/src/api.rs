use std::sync::Arc;

use askama::Template;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tikgrab_core::{DownloadResult, GrabError, GrabResult, Platform};

use crate::handler::DownloadHandler;
use crate::page::IndexPage;
use crate::view::ProxyTemplate;

pub const RESULT_KIND_HEADER: HeaderName = HeaderName::from_static("x-result-kind");

#[derive(Clone)]
pub struct AppState {
    handler: Arc<DownloadHandler>,
    proxy: Arc<ProxyTemplate>,
}

impl AppState {
    pub fn new(handler: DownloadHandler, proxy: ProxyTemplate) -> Self {
        Self {
            handler: Arc::new(handler),
            proxy: Arc::new(proxy),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/download", get(download))
        .route("/api/tik.json", get(download))
        .with_state(state)
}

#[derive(Debug, Default, PartialEq)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub platform: Option<String>,
}

impl DownloadQuery {
    /// Parses the query string leniently. A repeated key keeps its first value.
    fn from_raw(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let pairs = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "url" => &mut query.url,
                "platform" => &mut query.platform,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    /// An empty selector value means "infer from the URL".
    fn platform(&self) -> GrabResult<Option<Platform>> {
        match self.platform.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name.parse().map(Some),
        }
    }
}

async fn download(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    let query = DownloadQuery::from_raw(raw.as_deref());
    let platform = query.platform()?;
    let result = state.handler.handle(query.url.as_deref(), platform).await?;
    Ok(DownloadReply(result).into_response())
}

async fn index(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, ApiError> {
    let query = DownloadQuery::from_raw(raw.as_deref());
    let Some(url) = query.url.as_deref() else {
        return render(&IndexPage::blank());
    };
    let platform_name = query.platform.as_deref().unwrap_or_default();

    let outcome = match query.platform() {
        Ok(platform) => state.handler.handle(Some(url), platform).await,
        Err(err) => Err(err),
    };
    render(&IndexPage::with_outcome(url, platform_name, &outcome, &state.proxy))
}

fn render(page: &IndexPage<'_>) -> Result<Html<String>, ApiError> {
    page.render()
        .map(Html)
        .map_err(|err| ApiError::Render(err.to_string()))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Successful download body, tagged with its variant in `x-result-kind`.
pub struct DownloadReply(pub DownloadResult);

impl IntoResponse for DownloadReply {
    fn into_response(self) -> Response {
        let kind = HeaderValue::from_static(self.0.kind().as_str());
        let mut response = (StatusCode::OK, Json(self.0)).into_response();
        response.headers_mut().insert(RESULT_KIND_HEADER, kind);
        response
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Grab(#[from] GrabError),
    #[error("failed to render page: {0}")]
    Render(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Grab(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::handler::tests::{FakeExtractor, fake_apify, handler_with, sample_video};

    fn app(extractor: FakeExtractor, apify_endpoint: &str) -> Router {
        let (handler, _) = handler_with(extractor, apify_endpoint);
        let proxy = ProxyTemplate::new("https://dl.example.dev").unwrap();
        router(AppState::new(handler, proxy))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let kind = response
            .headers()
            .get(RESULT_KIND_HEADER)
            .map(|value| value.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, kind, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn missing_url_is_400() {
        for uri in ["/api/download", "/api/download?url=", "/api/download?url=%20%20"] {
            let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
            let (status, kind, body) = get_json(app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(kind, None);
            assert_eq!(body, json!({ "error": "url is required" }));
        }
    }

    #[tokio::test]
    async fn tiktok_body_is_extractor_value_verbatim() {
        let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
        let (status, kind, body) = get_json(
            app,
            "/api/download?url=https%3A%2F%2Fwww.tiktok.com%2F%40user%2Fvideo%2F123",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kind.as_deref(), Some("tiktok"));
        assert_eq!(body, serde_json::to_value(sample_video()).unwrap());
        assert_eq!(
            body,
            json!({
                "status": "success",
                "result": {
                    "videoSD": "a.mp4",
                    "videoHD": "b.mp4",
                    "author": { "nickname": "user" }
                }
            })
        );
    }

    #[tokio::test]
    async fn extractor_failure_is_500_with_message() {
        let app = app(
            FakeExtractor::failing("Url parsing is failed!"),
            "http://127.0.0.1:9/run",
        );
        let (status, _, body) =
            get_json(app, "/api/tik.json?url=https://www.tiktok.com/@user/video/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Url parsing is failed!" }));
    }

    #[tokio::test]
    async fn douyin_success_is_exact_download_url() {
        let endpoint =
            fake_apify(StatusCode::OK, json!({ "items": [{ "downloadUrl": "X" }] })).await;
        let (status, kind, body) = get_json(
            app(FakeExtractor::returning(sample_video()), &endpoint),
            "/api/download?url=https://v.douyin.com/xyz",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kind.as_deref(), Some("douyin"));
        assert_eq!(body, json!({ "downloadUrl": "X" }));
    }

    #[tokio::test]
    async fn douyin_empty_items_is_400() {
        let endpoint = fake_apify(StatusCode::OK, json!({ "items": [] })).await;
        let (status, _, body) = get_json(
            app(FakeExtractor::returning(sample_video()), &endpoint),
            "/api/download?url=https://v.douyin.com/xyz",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No download URL found for Douyin video" }));
    }

    #[tokio::test]
    async fn douyin_upstream_error_is_500() {
        let endpoint = fake_apify(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
        let (status, _, body) = get_json(
            app(FakeExtractor::returning(sample_video()), &endpoint),
            "/api/download?url=https://www.douyin.com/video/1",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_platform_is_400() {
        let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
        let (status, _, body) =
            get_json(app, "/api/download?url=https://x.test/1&platform=vimeo").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "invalid input: unknown platform: vimeo" }));
    }

    #[tokio::test]
    async fn index_renders_result_server_side() {
        let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?url=https://www.tiktok.com/@user/video/123&platform=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<video controls src=\"a.mp4\""));
        assert!(html.contains("Download Video HD Without Watermark"));
    }

    #[test]
    fn query_keeps_first_value_of_repeated_keys() {
        let query = DownloadQuery::from_raw(Some("url=a&platform=douyin&url=b&platform=&x=1"));
        assert_eq!(
            query,
            DownloadQuery {
                url: Some("a".into()),
                platform: Some("douyin".into()),
            }
        );
        assert_eq!(DownloadQuery::from_raw(None), DownloadQuery::default());
    }

    #[tokio::test]
    async fn repeated_url_uses_first_value() {
        let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
        let (status, kind, _) = get_json(
            app,
            "/api/download?url=https://www.tiktok.com/@user/video/1&url=https://v.douyin.com/x",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kind.as_deref(), Some("tiktok"));
    }

    #[tokio::test]
    async fn repeated_blank_url_is_json_400() {
        let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
        let (status, _, body) =
            get_json(app, "/api/download?url=&url=https://www.tiktok.com/@user/video/1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "url is required" }));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app(FakeExtractor::returning(sample_video()), "http://127.0.0.1:9/run");
        let (status, _, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
