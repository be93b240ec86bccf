use std::fmt::Display;

/// The search filter used when none is provided.
pub const DEFAULT_SEARCH_FILTER: &str = "stars:>=1";

/// The sort key of the repositories search, always by stars.
pub const SEARCH_SORT: &str = "stars";

/// The order of the repositories search, always descending.
pub const SEARCH_ORDER: &str = "desc";

/// A search query sent to the repositories search endpoint.
///
/// Only the filter can vary: results are always sorted by stars in descending order.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct SearchQuery {
    /// The text filter (e.g. `stars:>=1 language:rust`).
    pub(crate) filter: String,
}

impl SearchQuery {
    /// Creates a new `SearchQuery` with the given filter.
    pub fn new(filter: &str) -> Self {
        Self {
            filter: filter.to_string(),
        }
    }

    /// Retrieves the text filter.
    pub fn filter(&self) -> &str {
        &self.filter
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_FILTER)
    }
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchQuery: q={}, sort={SEARCH_SORT}, order={SEARCH_ORDER}",
            self.filter
        )
    }
}

/// A GET request sent through an HTTP transport.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct HttpRequest {
    /// The absolute URL.
    pub(crate) url: String,

    /// The request headers, in insertion order.
    pub(crate) headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a new GET `HttpRequest` without headers.
    pub fn get(url: &str) -> Self {
        Self {
            url: url.to_string(),
            headers: vec![],
        }
    }

    /// Adds a header to the request.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds a header to the request when a value is given.
    pub fn with_optional_header(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_header(name, value),
            None => self,
        }
    }

    /// Retrieves the URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retrieves the headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Retrieves the first value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Creates a dummy `HttpRequest` for testing purposes.
    #[cfg(test)]
    pub(crate) fn dummy() -> Self {
        Self::get("https://api.example.com/search/repositories?q=dummy&page=1")
    }
}

impl Display for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GET {}", self.url)
    }
}
