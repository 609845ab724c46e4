use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use super::{
    ReqwestTransportBuilder, RetryPolicy, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use crate::client::{Authentication, AuthenticationError};

/// A [`Transport`] built on [`reqwest`].
///
/// Owns everything that is shared by the calls of an application: base URL, default headers
/// (such as the `X-BEAM-SCOPE` of the realm), the credential and the retry policy.
///
/// Cloning is cheap and clones share the credential, so [`set_authentication`](Self::set_authentication)
/// on one of them is seen by all.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    pub(super) client: reqwest::Client,
    pub(super) base_url: Url,
    pub(super) default_headers: HeaderMap,
    pub(super) authentication: Arc<RwLock<Option<Authentication>>>,
    pub(super) retry: Option<RetryPolicy>,
}

impl ReqwestTransport {
    /// Creates a builder, targeting `http://127.0.0.1:80` by default.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replaces the credential attached to authenticated endpoints.
    ///
    /// Calls already in flight keep the credential they started with.
    pub async fn set_authentication(&self, authentication: Authentication) {
        let mut current = self.authentication.write().await;
        *current = Some(authentication);
    }

    /// Removes the credential, authenticated endpoints then fail before any I/O.
    pub async fn clear_authentication(&self) {
        let mut current = self.authentication.write().await;
        *current = None;
    }

    /// Checks whether a credential is configured.
    pub async fn has_authentication(&self) -> bool {
        self.authentication.read().await.is_some()
    }

    fn resolve_url(&self, relative: &str) -> Result<Url, TransportError> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            relative.trim_start_matches('/')
        );
        let url = url.parse::<Url>()?;
        Ok(url)
    }

    /// The credential header of a request.
    ///
    /// A signed credential signs every request, other credentials only go to endpoints that
    /// require authentication.
    async fn credential(
        &self,
        request: &TransportRequest,
        url: &Url,
    ) -> Result<Option<(HeaderName, HeaderValue)>, TransportError> {
        let authentication = self.authentication.read().await;
        let authentication = match authentication.as_ref() {
            Some(authentication) if request.with_auth || authentication.is_signed() => {
                authentication
            }
            Some(_) => return Ok(None),
            None if request.with_auth => {
                return Err(AuthenticationError::MissingCredential.into());
            }
            None => return Ok(None),
        };

        let path_and_query = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let header = authentication.to_request_header(
            &request.method,
            &path_and_query,
            request.body.as_deref(),
        )?;
        Ok(Some(header))
    }

    fn build_request(
        &self,
        request: &TransportRequest,
        url: Url,
        credential: Option<&(HeaderName, HeaderValue)>,
    ) -> reqwest::Request {
        let mut result = reqwest::Request::new(request.method.clone(), url);
        let req_headers = result.headers_mut();

        for (name, value) in &self.default_headers {
            req_headers.insert(name.clone(), value.clone());
        }

        if let Some((name, value)) = credential {
            req_headers.insert(name.clone(), value.clone());
        }

        for (name, value) in &request.headers {
            req_headers.insert(name.clone(), value.clone());
        }

        if let Some(body) = &request.body {
            *result.body_mut() = Some(reqwest::Body::from(body.clone()));
        }

        result
    }

    async fn execute(&self, request: reqwest::Request) -> Result<TransportResponse, TransportError> {
        let response = self.client.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.resolve_url(&request.url)?;

        // Resolved once, every attempt of this call uses the same credential
        let credential = self.credential(&request, &url).await?;

        let attempt = || {
            let outgoing = self.build_request(&request, url.clone(), credential.as_ref());
            self.execute(outgoing)
        };

        let Some(policy) = &self.retry else {
            return attempt().await;
        };

        attempt
            .retry(policy.backoff())
            .when(TransportError::is_retryable)
            .notify(|error: &TransportError, delay: Duration| {
                warn!(%error, ?delay, method = %request.method, %url, "retrying request");
            })
            .await
            .inspect_err(|error| debug!(%error, "request failed"))
    }
}
