use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrabError {
    #[error("url is required")]
    MissingInput,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    UpstreamRequestFailed(String),
    #[error("No download URL found for Douyin video")]
    UpstreamEmptyResult,
    #[error("{0}")]
    ExtractionFailed(String),
}

impl GrabError {
    /// HTTP status the request handler answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GrabError::MissingInput
            | GrabError::InvalidInput(_)
            | GrabError::UpstreamEmptyResult => 400,
            GrabError::Config(_)
            | GrabError::UpstreamRequestFailed(_)
            | GrabError::ExtractionFailed(_) => 500,
        }
    }
}

pub type GrabResult<T> = Result<T, GrabError>;

#[cfg(test)]
mod tests {
    use super::GrabError;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(GrabError::MissingInput.status_code(), 400);
        assert_eq!(GrabError::UpstreamEmptyResult.status_code(), 400);
        assert_eq!(GrabError::InvalidInput("x".into()).status_code(), 400);
    }

    #[test]
    fn upstream_errors_map_to_500() {
        assert_eq!(
            GrabError::UpstreamRequestFailed("boom".into()).status_code(),
            500
        );
        assert_eq!(GrabError::ExtractionFailed("boom".into()).status_code(), 500);
        assert_eq!(GrabError::Config("no token".into()).status_code(), 500);
    }

    #[test]
    fn messages_match_api_contract() {
        assert_eq!(GrabError::MissingInput.to_string(), "url is required");
        assert_eq!(
            GrabError::UpstreamEmptyResult.to_string(),
            "No download URL found for Douyin video"
        );
        assert_eq!(
            GrabError::ExtractionFailed("video unavailable".into()).to_string(),
            "video unavailable"
        );
    }
}
