use headers::HeaderMapExt;
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

mod descriptor;
pub use self::descriptor::EndpointDescriptor;

mod identifier;
pub use self::identifier::ObjectId;

mod parameters;
pub use self::parameters::{
    CallBody, CallHeaders, CallQuery, ParamStyle, ParamValue, ParameterValue, PathParams,
    resolve_path,
};

mod request;
pub use self::request::RequestParameters;

mod envelope;
pub use self::envelope::{RawBody, ResponseEnvelope};

mod transport;
pub use self::transport::{
    ReqwestTransport, ReqwestTransportBuilder, RetryPolicy, Transport, TransportError,
    TransportRequest, TransportResponse,
};

mod auth;
pub use self::auth::{Authentication, AuthenticationError, SIGNATURE_HEADER, SecureString};

mod error;
pub use self::error::DispatchError;

#[cfg(test)]
mod integration_tests;

/// Header overriding the player identity otherwise inferred from the bearer token.
pub const GAMERTAG_HEADER: HeaderName = HeaderName::from_static("x-beam-gamertag");

/// Header carrying the `<customer-id>.<project-id>` scope of a request.
pub const SCOPE_HEADER: HeaderName = HeaderName::from_static("x-beam-scope");

/// Composes an [`EndpointDescriptor`] and [`RequestParameters`] into one transport call.
///
/// The dispatcher holds nothing but its transport: every call is independent, so a single
/// instance (or clones of it) can serve any number of concurrent requests as long as the
/// transport itself is safe to share.
///
/// # Example
///
/// ```rust,no_run
/// use beam_dispatch::{Dispatcher, EndpointDescriptor, ReqwestTransport, RequestParameters};
///
/// const LEADERBOARD_LIST: EndpointDescriptor =
///     EndpointDescriptor::get("/basic/leaderboards/list").with_auth();
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Dispatcher::new(ReqwestTransport::builder().build()?);
///
/// let response = dispatcher
///     .dispatch_raw(
///         &LEADERBOARD_LIST,
///         RequestParameters::new()
///             .with_query_param("limit", 10)
///             .with_query_param("prefix", None::<String>),
///     )
///     .await?;
///
/// if !response.is_success() {
///     eprintln!("leaderboards unavailable: {}", response.status_code());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<T> {
    transport: T,
}

impl<T> Dispatcher<T> {
    /// Wraps a transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> Dispatcher<T>
where
    T: Transport,
{
    /// Sends the request and returns the undecoded response.
    ///
    /// Exactly one [`Transport::send`] happens per call, and only once the request has been
    /// fully built. Non-success statuses are returned, not raised.
    pub async fn dispatch_raw(
        &self,
        descriptor: &EndpointDescriptor,
        parameters: RequestParameters,
    ) -> Result<ResponseEnvelope<RawBody>, DispatchError> {
        let request = build_request(descriptor, parameters)?;

        debug!(method = %request.method, url = %request.url, with_auth = request.with_auth, "sending...");
        let response = self.transport.send(request).await?;
        debug!(status = %response.status, "...receiving");

        Ok(ResponseEnvelope::from(response))
    }

    /// Sends the request and decodes the response body as JSON into `R`.
    ///
    /// Decoding is attempted whatever the status, a body that does not match `R` yields
    /// [`DispatchError::Decode`] carrying the status. Use [`dispatch_raw`](Self::dispatch_raw)
    /// to inspect error responses before decoding.
    pub async fn dispatch<R>(
        &self,
        descriptor: &EndpointDescriptor,
        parameters: RequestParameters,
    ) -> Result<ResponseEnvelope<R>, DispatchError>
    where
        R: DeserializeOwned,
    {
        self.dispatch_raw(descriptor, parameters)
            .await?
            .decode_json()
    }
}

/// Builds the outbound request: path, query, headers and body.
pub(in crate::client) fn build_request(
    descriptor: &EndpointDescriptor,
    parameters: RequestParameters,
) -> Result<TransportRequest, DispatchError> {
    let RequestParameters {
        path,
        query,
        headers,
        body,
        gamertag,
    } = parameters;

    let path = path.resolve(descriptor.path_template())?;
    let query = query.to_query_string()?;
    let url = format!("{path}{query}");

    let mut header_map = HeaderMap::new();
    if let Some(gamertag) = gamertag {
        header_map.insert(GAMERTAG_HEADER, HeaderValue::from_str(gamertag.as_str())?);
    }

    let body = body.map(|body| {
        header_map.typed_insert(body.content_type);
        body.data
    });

    // Caller overrides go last so they win over the headers above
    for (name, value) in headers.to_http_headers()? {
        header_map.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(&value)?,
        );
    }

    Ok(TransportRequest {
        method: descriptor.method().clone(),
        url,
        headers: header_map,
        body,
        with_auth: descriptor.requires_auth(),
    })
}
