use anyhow::Context;
use reqwest::Client;

use crate::{HttpRequest, HttpResponse, HttpTransport, StdResult};

/// The user agent sent with every request, the GitHub API rejects requests without one.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// An HTTP transport backed by a `reqwest` client.
///
/// The client pools connections and can be shared by concurrent callers.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport` instance.
    pub fn try_new() -> StdResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| "Failed to build the HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> StdResult<HttpResponse> {
        let mut builder = self.client.get(request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send request: {request}"))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body: {request}"))?
            .to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;

    use super::*;

    #[tokio::test]
    async fn execute_forwards_headers_and_returns_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/repos/org-1/repository-1/topics")
                .header("Accept", "application/json")
                .header_exists("User-Agent");
            then.status(200)
                .header("X-RateLimit-Remaining", "59")
                .body("{\"names\":[]}");
        });
        let transport = ReqwestTransport::try_new().unwrap();
        let request = HttpRequest::get(&server.url("/repos/org-1/repository-1/topics"))
            .with_header("Accept", "application/json");

        let response = transport.execute(&request).await.unwrap();

        mock.assert();
        assert_eq!(200, response.status());
        assert_eq!(Some("59"), response.header("x-ratelimit-remaining"));
        assert_eq!("{\"names\":[]}", response.text());
    }

    #[tokio::test]
    async fn execute_returns_unsuccessful_responses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/search/repositories");
            then.status(500).body("oops");
        });
        let transport = ReqwestTransport::try_new().unwrap();

        let response = transport
            .execute(&HttpRequest::get(&server.url("/search/repositories")))
            .await
            .unwrap();

        assert!(!response.is_success());
        assert_eq!(500, response.status());
    }

    #[tokio::test]
    async fn execute_fails_on_transport_error() {
        let transport = ReqwestTransport::try_new().unwrap();

        transport
            .execute(&HttpRequest::get("http://127.0.0.1:1/search/repositories"))
            .await
            .expect_err("Expected a transport error");
    }
}
