use std::{fmt::Display, time::Duration};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};

use super::{FetcherError, Repository, StdResult};

/// The header holding the number of requests left in the current rate limit window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// The header holding the reset time of the current rate limit window, in epoch seconds.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// A response received from an HTTP transport.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub(crate) status: u16,

    /// The response headers.
    pub(crate) headers: Vec<(String, String)>,

    /// The raw response body.
    pub(crate) body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse` instance.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Retrieves the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Retrieves the first value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decodes the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> StdResult<T> {
        serde_json::from_slice(&self.body).with_context(|| {
            format!(
                "Failed to parse response body as {}",
                std::any::type_name::<T>()
            )
        })
    }

    /// Creates a dummy successful `HttpResponse` with a JSON body for testing purposes.
    #[cfg(test)]
    pub(crate) fn dummy_json(value: serde_json::Value) -> Self {
        Self::new(200, vec![], value.to_string().into_bytes())
    }
}

/// The rate limit of the API, as read from the headers of an exhausted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitState {
    /// The remaining number of requests in the current window.
    pub remaining: u32,

    /// The time at which the window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitState {
    /// Reads the rate limit headers of a response.
    ///
    /// Returns `None` unless the remaining header is present and equal to zero. An exhausted
    /// rate limit without a readable reset header is an error since no safe delay can be derived.
    pub fn parse_exceeded(response: &HttpResponse, url: &str) -> StdResult<Option<Self>> {
        let remaining = response
            .header(RATE_LIMIT_REMAINING_HEADER)
            .and_then(|value| value.trim().parse::<u32>().ok());
        if remaining != Some(0) {
            return Ok(None);
        }

        let reset_header = response.header(RATE_LIMIT_RESET_HEADER).ok_or_else(|| {
            FetcherError::MissingRateLimitReset {
                url: url.to_string(),
            }
        })?;
        let reset_at = reset_header
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .ok_or_else(|| FetcherError::InvalidRateLimitReset {
                url: url.to_string(),
                value: reset_header.to_string(),
            })?;

        Ok(Some(Self {
            remaining: 0,
            reset_at,
        }))
    }

    /// Computes the time left until the reset, zero if it is already in the past.
    pub fn duration_until_reset(&self, now: DateTime<Utc>) -> Duration {
        (self.reset_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl Display for RateLimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RateLimit: remaining={}, reset={}",
            self.remaining,
            self.reset_at.to_rfc3339()
        )
    }
}

/// A page of the repositories search.
#[derive(Deserialize, Debug)]
pub struct ResultPage {
    /// The total number of repositories matching the query.
    pub total_count: u64,

    /// Whether the search timed out before collecting every match.
    #[serde(default)]
    pub incomplete_results: bool,

    /// The repositories of the page, in ranking order.
    pub items: Vec<Repository>,
}

/// The topics of a repository.
#[derive(Deserialize, Debug)]
pub struct TopicsResponse {
    /// The topic names.
    pub names: Vec<String>,
}

/// The flat file tree of a repository at a given reference.
#[derive(Deserialize, Debug)]
pub struct GitTreeResponse {
    /// The tree entries.
    pub tree: Vec<TreeNode>,
}

/// An entry of a file tree.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// The path relative to the repository root.
    pub path: String,
}

impl GitTreeResponse {
    /// Finds the first entry whose path contains `README`, ignoring case.
    pub fn find_readme(&self) -> Option<&TreeNode> {
        self.tree
            .iter()
            .find(|node| node.path.to_ascii_uppercase().contains("README"))
    }
}
