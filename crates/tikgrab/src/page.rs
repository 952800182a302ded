use askama::Template;
use tikgrab_core::{DownloadResult, GrabError};

use crate::view::{ProxyTemplate, ResultView};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub url: &'a str,
    pub platform: &'a str,
    pub view: Option<ResultView>,
    pub error: Option<String>,
}

impl<'a> IndexPage<'a> {
    pub fn blank() -> Self {
        Self {
            url: "",
            platform: "",
            view: None,
            error: None,
        }
    }

    pub fn with_outcome(
        url: &'a str,
        platform: &'a str,
        outcome: &Result<DownloadResult, GrabError>,
        proxy: &ProxyTemplate,
    ) -> Self {
        let (view, error) = match outcome {
            Ok(result) => (Some(ResultView::build(result, proxy)), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            url,
            platform,
            view,
            error,
        }
    }
}
