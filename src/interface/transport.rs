use crate::{HttpRequest, HttpResponse, StdResult};

/// A trait for sending HTTP requests.
///
/// Every response received is returned, whatever its status: only transport failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HttpTransport: Sync + Send {
    /// Sends the request and waits for the response.
    async fn execute(&self, request: &HttpRequest) -> StdResult<HttpResponse>;
}
