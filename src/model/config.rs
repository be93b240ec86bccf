/// The REST API production endpoint for GitHub.
pub const GITHUB_API_ENDPOINT: &str = "https://api.github.com";

/// The endpoint serving raw file contents for GitHub.
pub const GITHUB_RAW_CONTENT_ENDPOINT: &str = "https://raw.githubusercontent.com";

/// The configuration of a fetcher, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// The root URL of the REST API.
    pub api_url: String,

    /// The root URL serving raw file contents.
    pub raw_content_url: String,

    /// The optional API token, anonymous requests are made without it.
    pub token: Option<String>,

    /// The optional page size of the search requests, the API default applies without it.
    pub per_page: Option<u8>,
}

impl FetcherConfig {
    /// Creates a new `FetcherConfig` targeting the given endpoints.
    pub fn new(api_url: &str, raw_content_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            raw_content_url: raw_content_url.trim_end_matches('/').to_string(),
            token: None,
            per_page: None,
        }
    }

    /// Sets the API token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Sets the page size of the search requests.
    pub fn with_per_page(mut self, per_page: Option<u8>) -> Self {
        self.per_page = per_page;
        self
    }

    /// Retrieves the value of the `Authorization` header, if a token is configured.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("token {token}"))
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::new(GITHUB_API_ENDPOINT, GITHUB_RAW_CONTENT_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_uses_token_scheme() {
        let config = FetcherConfig::default().with_token(Some("secret".to_string()));

        assert_eq!(config.authorization(), Some("token secret".to_string()));
        assert_eq!(FetcherConfig::default().authorization(), None);
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = FetcherConfig::new("http://localhost:8080/", "http://localhost:8081//");

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.raw_content_url, "http://localhost:8081");
    }
}
