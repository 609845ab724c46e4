use std::fmt::Debug;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderMap, Uri};
use tokio::sync::RwLock;
use url::Url;

use super::{ReqwestTransport, RetryPolicy, TransportError};
use crate::client::{Authentication, SCOPE_HEADER};

/// Builder for [`ReqwestTransport`].
///
/// # Example
///
/// ```rust
/// use beam_dispatch::{Authentication, ReqwestTransport, RetryPolicy};
/// use http::uri::Scheme;
///
/// # fn example() -> Result<(), beam_dispatch::TransportError> {
/// let transport = ReqwestTransport::builder()
///     .with_scheme(Scheme::HTTPS)
///     .with_host("api.example.com")
///     .with_port(443)
///     .with_base_path("/v1")?
///     .with_scope("1338004997867619", "DE_1338004997867621")?
///     .with_authentication(Authentication::Bearer("access-token".into()))
///     .with_retry(RetryPolicy::default())
///     .build()?;
///
/// assert_eq!(transport.base_url().as_str(), "https://api.example.com/v1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransportBuilder {
    client: reqwest::Client,
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: Option<PathAndQuery>,
    default_headers: HeaderMap,
    authentication: Option<Authentication>,
    retry: Option<RetryPolicy>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            scheme: Scheme::HTTP,
            host: "127.0.0.1".to_string(),
            port: 80,
            base_path: None,
            default_headers: HeaderMap::new(),
            authentication: None,
            retry: None,
        }
    }
}

impl ReqwestTransportBuilder {
    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when scheme, host, port and base path do not form a valid URL.
    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let Self {
            client,
            scheme,
            host,
            port,
            base_path,
            default_headers,
            authentication,
            retry,
        } = self;

        let builder = Uri::builder()
            .scheme(scheme)
            .authority(format!("{host}:{port}"));
        let builder = if let Some(path) = &base_path {
            builder.path_and_query(path.path())
        } else {
            builder.path_and_query("/")
        };
        let base_uri = builder.build()?;
        let base_url = base_uri.to_string().parse::<Url>()?;

        Ok(ReqwestTransport {
            client,
            base_url,
            default_headers,
            authentication: Arc::new(RwLock::new(authentication)),
            retry,
        })
    }

    /// Uses a preconfigured reqwest client, for timeouts, proxies or TLS settings.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the URL scheme, `http` by default.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the host, `127.0.0.1` by default.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port, `80` by default.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a path prefixed to every request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidBaseUrl`] if the path is not a valid URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, TransportError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| TransportError::InvalidBaseUrl {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Sets scheme, host, port and base path from a single URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the URL cannot be parsed or has no host.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(base_url)?;
        let Some(host) = url.host_str() else {
            return Err(TransportError::InvalidBaseUrl {
                error: format!("missing host in '{base_url}'"),
            });
        };
        let Some(port) = url.port_or_known_default() else {
            return Err(TransportError::InvalidBaseUrl {
                error: format!("missing port in '{base_url}'"),
            });
        };
        let scheme =
            Scheme::try_from(url.scheme()).map_err(|err| TransportError::InvalidBaseUrl {
                error: err.to_string(),
            })?;

        self.scheme = scheme;
        self.host = host.to_string();
        self.port = port;
        if url.path() == "/" {
            self.base_path = None;
            return Ok(self);
        }
        self.with_base_path(url.path())
    }

    /// Scopes every request to a realm with the `X-BEAM-SCOPE` header.
    ///
    /// The header is `<customer_id>.<project_id>`, or only the customer id when `project_id`
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidHeaderValue`] if the ids are not valid header content.
    pub fn with_scope(
        mut self,
        customer_id: impl AsRef<str>,
        project_id: impl AsRef<str>,
    ) -> Result<Self, TransportError> {
        let customer_id = customer_id.as_ref();
        let project_id = project_id.as_ref();
        let scope = if project_id.is_empty() {
            customer_id.to_string()
        } else {
            format!("{customer_id}.{project_id}")
        };
        self.default_headers
            .insert(SCOPE_HEADER, HeaderValue::from_str(&scope)?);
        Ok(self)
    }

    /// Adds a header sent with every request.
    ///
    /// Headers of the request itself take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the name or the value is invalid.
    pub fn with_default_header(
        mut self,
        name: &str,
        value: &str,
    ) -> Result<Self, TransportError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the credential attached to endpoints that require authentication.
    #[must_use]
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Retries connection failures following the policy. Nothing is retried by default.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }
}
