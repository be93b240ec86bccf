use thiserror::Error;

/// The standard result type used throughout the application.
pub type StdResult<T> = Result<T, anyhow::Error>;

/// Fetcher error
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FetcherError {
    /// Remote error: the API answered with an unsuccessful status that is not a rate limit
    #[error("Remote error when fetching {url}: status={status}, body={body}")]
    Remote {
        /// The requested URL
        url: String,
        /// The HTTP status code
        status: u16,
        /// The response body, kept for diagnostics
        body: String,
    },

    /// The API reported an exhausted rate limit without telling when it resets
    #[error("Rate limit exceeded when fetching {url} but no reset header was found")]
    MissingRateLimitReset {
        /// The requested URL
        url: String,
    },

    /// The rate limit reset header could not be read as epoch seconds
    #[error("Rate limit reset header of {url} is not an epoch timestamp: {value}")]
    InvalidRateLimitReset {
        /// The requested URL
        url: String,
        /// The raw header value
        value: String,
    },
}
