//! The HTTP seam between fetch policy and the network.
//!
//! Everything above this trait (retries, verification, caching, credential
//! exchange) is policy; implementations only move bytes. Production code
//! uses [`ReqwestTransport`]; tests script the trait directly.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream of response body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Failure of a single HTTP operation.
///
/// The variants matter to the retry loop: timeouts and error statuses are
/// counted against the attempt budget like any other transient failure, but
/// they surface as distinct kinds once the budget is spent.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Response metadata the fetcher cares about.
#[derive(Debug, Clone, Default)]
pub struct ResponseParts {
    pub status: u16,
    /// Declared body length, if the server sent `Content-Length`.
    pub content_length: Option<u64>,
    /// Raw `etag` header value, if present.
    pub etag: Option<String>,
}

/// Minimal HTTP capability consumed by the fetcher.
///
/// Implementations resolve redirects and timeouts themselves and must map
/// non-success statuses to [`TransportError::Status`]; the fetch layer never
/// inspects a failed response body.
pub trait Transport: Send + Sync {
    /// Fetch an object's headers without its body.
    fn head(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<ResponseParts, TransportError>> + Send;

    /// Open a streaming GET; returns headers plus the body stream.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<(ResponseParts, BodyStream), TransportError>> + Send;

    /// POST a form (query-style parameters) and return the response body.
    fn post_form(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::TryStreamExt;

    use super::{BodyStream, ResponseParts, Transport, TransportError};

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Production [`Transport`] backed by a shared `reqwest::Client`.
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self, TransportError> {
            let client = reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .map_err(|e| TransportError::Other(e.to_string()))?;
            Ok(Self { client })
        }

        fn apply_headers(
            mut request: reqwest::RequestBuilder,
            headers: &[(String, String)],
        ) -> reqwest::RequestBuilder {
            for (name, value) in headers {
                request = request.header(name, value);
            }
            request
        }

        fn classify(url: &str, error: reqwest::Error) -> TransportError {
            if error.is_timeout() {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else if error.is_connect() {
                TransportError::Connect(error.to_string())
            } else {
                TransportError::Other(error.to_string())
            }
        }

        fn parts_of(url: &str, response: &reqwest::Response) -> Result<ResponseParts, TransportError> {
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            let headers = response.headers();
            Ok(ResponseParts {
                status: status.as_u16(),
                content_length: headers
                    .get(reqwest::header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
                etag: headers
                    .get(reqwest::header::ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            })
        }
    }

    impl Transport for ReqwestTransport {
        async fn head(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<ResponseParts, TransportError> {
            let response = Self::apply_headers(self.client.head(url), headers)
                .send()
                .await
                .map_err(|e| Self::classify(url, e))?;
            Self::parts_of(url, &response)
        }

        async fn get(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<(ResponseParts, BodyStream), TransportError> {
            let response = Self::apply_headers(self.client.get(url), headers)
                .send()
                .await
                .map_err(|e| Self::classify(url, e))?;
            let parts = Self::parts_of(url, &response)?;
            let owned_url = url.to_string();
            let stream = response
                .bytes_stream()
                .map_err(move |e| Self::classify(&owned_url, e));
            Ok((parts, Box::pin(stream)))
        }

        async fn post_form(
            &self,
            url: &str,
            params: &[(String, String)],
        ) -> Result<String, TransportError> {
            let response = self
                .client
                .post(url)
                .query(params)
                .send()
                .await
                .map_err(|e| Self::classify(url, e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            response
                .text()
                .await
                .map_err(|e| Self::classify(url, e))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
