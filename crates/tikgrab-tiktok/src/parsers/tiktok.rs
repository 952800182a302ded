use regex::Regex;
use url::Url;

pub fn is_tiktok_url(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    url.domain()
        .map(|domain| domain == "tiktok.com" || domain.ends_with(".tiktok.com"))
        .unwrap_or(false)
}

/// Numeric id of a full `/@user/video/<id>` link. Short links (`vm.tiktok.com`)
/// carry no id until they are resolved upstream.
pub fn parse_tiktok_video_id(input: &str) -> Option<String> {
    let regex = Regex::new(r"tiktok\.com/@[^/]+/(?:video|photo)/(\d+)").ok()?;
    let captures = regex.captures(input)?;
    captures.get(1).map(|m| m.as_str().to_string())
}
