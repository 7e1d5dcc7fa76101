use std::time::Duration;

use crate::request::Endpoint;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const DEFAULT_LANGUAGE: &str = "ko-KR";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Connection settings for the metadata API.
pub struct CatalogConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Image CDN root, without a trailing slash.
    pub image_base_url: String,
    /// `language` query parameter sent with every request.
    pub language: String,
    /// Per-request timeout for catalog calls.
    pub timeout: Duration,
    /// Shorter timeout used when validating an API key at sign-in.
    pub validation_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(10),
            validation_timeout: Duration::from_secs(5),
        }
    }
}

impl CatalogConfig {
    /// Returns a copy that requests localized data in `language` (e.g. `en-US`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Returns a copy pointed at another API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Absolute URL for `endpoint`.
    pub fn endpoint_url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_join_base_and_path() {
        let config = CatalogConfig::default().with_base_url("http://localhost:9000/3/");
        assert_eq!(
            config.endpoint_url(&Endpoint::Detail(27205)),
            "http://localhost:9000/3/movie/27205"
        );
        assert_eq!(config.language, "ko-KR");
    }
}
