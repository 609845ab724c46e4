//! # Beam Dispatch
//!
//! Turn a static endpoint description plus per-call parameters into exactly one HTTP call,
//! and hand back a uniform [`ResponseEnvelope`].
//!
//! The crate is the runtime half of a generated REST client: every generated call site is a
//! `const` [`EndpointDescriptor`] and a handful of arguments forwarded to a [`Dispatcher`].
//!
//! - **[`EndpointDescriptor`]** - path template, HTTP verb and whether the call needs credentials
//! - **[`RequestParameters`]** - path parameters, query parameters, header overrides and body
//! - **[`Dispatcher`]** - stateless composition of the above into a [`TransportRequest`]
//! - **[`Transport`]** - the injected collaborator doing the network I/O and credential attachment
//! - **[`ReqwestTransport`]** - a ready-made [`Transport`] built on `reqwest`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beam_dispatch::{Authentication, Dispatcher, EndpointDescriptor, ReqwestTransport, RequestParameters};
//! # use serde::Deserialize;
//! # #[derive(Debug, Deserialize)]
//! # struct Account { id: u64 }
//!
//! const GET_ACCOUNT: EndpointDescriptor =
//!     EndpointDescriptor::get("/object/accounts/{objectId}/").with_auth();
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::builder()
//!     .with_base_url("https://api.example.com")?
//!     .with_scope("1338004997867619", "DE_1338004997867621")?
//!     .with_authentication(Authentication::Bearer("my-access-token".into()))
//!     .build()?;
//! let dispatcher = Dispatcher::new(transport);
//!
//! let response = dispatcher
//!     .dispatch::<Account>(
//!         &GET_ACCOUNT,
//!         RequestParameters::new().with_path_param("objectId", 123_456_789_012_345_u64),
//!     )
//!     .await?;
//!
//! println!("{} -> {:?}", response.status_code(), response.payload());
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with Parameters
//!
//! ```rust
//! use beam_dispatch::{CallQuery, ObjectId, ParamStyle, ParamValue, PathParams};
//!
//! # fn example() -> Result<(), beam_dispatch::DispatchError> {
//! // Path parameters, percent-encoded as path segments
//! let path = PathParams::new().add_param("objectId", ObjectId::from(123_456_789_012_345_u64));
//! assert_eq!(path.resolve("/object/accounts/{objectId}/")?, "/object/accounts/123456789012345/");
//!
//! // Query parameters, absent values are skipped and arrays repeat their key
//! let query = CallQuery::new()
//!     .add_param("page", 1)
//!     .add_param("pagesize", 20)
//!     .add_param("query", None::<String>)
//!     .add_param("tags", ParamValue::with_style(vec!["a", "b"], ParamStyle::PipeDelimited));
//! assert_eq!(query.to_query_string()?, "?page=1&pagesize=20&tags=a%7Cb");
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Request construction problems ([`DispatchError::MissingPathParameter`], dot-segment path
//! values, unsupported or unserializable parameter values, invalid headers) are reported before the transport is touched.
//! Transport failures are propagated as [`DispatchError::Transport`]. Non-success HTTP
//! statuses are *not* errors: they are returned in the [`ResponseEnvelope`].

mod client;

pub use self::client::{
    Authentication, AuthenticationError, CallBody, CallHeaders, CallQuery, DispatchError,
    Dispatcher, EndpointDescriptor, GAMERTAG_HEADER, ObjectId, ParamStyle, ParamValue,
    ParameterValue, PathParams, RawBody, ReqwestTransport, ReqwestTransportBuilder,
    RequestParameters, ResponseEnvelope, RetryPolicy, SCOPE_HEADER, SIGNATURE_HEADER,
    SecureString, Transport, TransportError, TransportRequest, TransportResponse, resolve_path,
};
