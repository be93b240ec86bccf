use std::sync::Arc;

use chrono::Utc;
use log::warn;
use tokio::time::sleep;

use crate::{FetcherError, HttpRequest, HttpResponse, HttpTransport, RateLimitState, StdResult};

/// This struct is responsible for enforcing the API rate limit on transport requests.
///
/// A rate limited request is retried once the window advertised by the API has reset, as many
/// times as needed. Any other unsuccessful response is turned into an error.
pub struct TransportRateLimitEnforcer {
    /// The transport to be rate limited.
    transport: Arc<dyn HttpTransport>,
}

impl TransportRateLimitEnforcer {
    /// Creates a new `TransportRateLimitEnforcer` instance with the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait::async_trait]
impl HttpTransport for TransportRateLimitEnforcer {
    /// Enforce the rate limit on the transport requests.
    async fn execute(&self, request: &HttpRequest) -> StdResult<HttpResponse> {
        loop {
            let response = self.transport.execute(request).await?;
            if response.is_success() {
                return Ok(response);
            }

            match RateLimitState::parse_exceeded(&response, request.url())? {
                Some(rate_limit) => {
                    let duration_until_reset = rate_limit.duration_until_reset(Utc::now());
                    warn!(
                        "Rate limit exceeded for request {request}, waiting for {duration_until_reset:?} ({rate_limit})"
                    );
                    sleep(duration_until_reset).await;
                }
                None => {
                    return Err(FetcherError::Remote {
                        url: request.url().to_string(),
                        status: response.status(),
                        body: response.text(),
                    }
                    .into());
                }
            }
        }
    }
}
