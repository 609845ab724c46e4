//! The network seam of the dispatcher.
//!
//! The [`Dispatcher`](super::Dispatcher) only builds [`TransportRequest`]s. A [`Transport`]
//! resolves them against a host, attaches the credential when asked to, performs the I/O and
//! hands back a [`TransportResponse`].

use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

use super::AuthenticationError;

mod retry;
pub use self::retry::RetryPolicy;

mod http_client;
pub use self::http_client::ReqwestTransport;

mod builder;
pub use self::builder::ReqwestTransportBuilder;

/// A fully built request, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP verb.
    pub method: Method,
    /// Resolved path followed by the query string, e.g. `/object/accounts/1/?page=1`.
    pub url: String,
    /// Headers contributed by the dispatcher and the caller.
    pub headers: HeaderMap,
    /// Encoded body, its `Content-Type` is already in `headers`.
    pub body: Option<Bytes>,
    /// Whether the transport must attach the configured credential.
    pub with_auth: bool,
}

/// The raw response of a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The complete response body.
    pub body: Bytes,
}

/// Performs the network I/O of a dispatched call.
///
/// Implementations must be shareable across tasks: a single transport typically serves
/// every call of an application.
///
/// # Example
///
/// ```rust
/// use beam_dispatch::{Transport, TransportError, TransportRequest, TransportResponse};
/// use http::StatusCode;
///
/// struct AlwaysNoContent;
///
/// impl Transport for AlwaysNoContent {
///     async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
///         Ok(TransportResponse {
///             status: StatusCode::NO_CONTENT,
///             headers: Default::default(),
///             body: Default::default(),
///         })
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Sends the request and reads the whole response.
    ///
    /// A non-success status is a valid response, not an error.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        T::send(self, request)
    }
}

impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        T::send(self, request)
    }
}

/// Errors raised by a [`Transport`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    Reqwest(reqwest::Error),

    /// URL parsing error when joining the base URL and the request path.
    Url(url::ParseError),

    /// HTTP protocol error from the http crate.
    Http(http::Error),

    /// Invalid default header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid default header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The credential is missing or cannot be sent.
    Authentication(AuthenticationError),

    /// Invalid base URL or base path configuration.
    #[display("Invalid base URL: {error}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// Description of why the base URL is invalid.
        error: String,
    },

    /// Failure of a third-party transport.
    #[from(skip)]
    Other(#[error(not(source))] Box<dyn Error + Send + Sync>),
}

impl TransportError {
    /// Wraps the error of a custom transport.
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Other(error.into())
    }

    /// Connection-level failures that may succeed when attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}
