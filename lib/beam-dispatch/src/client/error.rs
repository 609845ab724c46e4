use http::StatusCode;

use super::envelope::RawBody;
use super::transport::TransportError;

/// Errors that can occur while dispatching a call.
///
/// Every variant but [`Transport`](Self::Transport) and the decoding variants is raised while
/// the request is built, before the transport is involved. A non-success HTTP status is never
/// an error by itself: see [`ResponseEnvelope`](super::ResponseEnvelope).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum DispatchError {
    /// The transport failed to deliver the request or to read the response.
    Transport(TransportError),

    /// Invalid HTTP header name.
    ///
    /// Occurs when a header override has a name that is not a valid HTTP token.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    ///
    /// Occurs when a header or gamertag value contains characters not allowed in headers.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error of a request body.
    Serialization(serde_json::Error),

    /// Query or form serialization error.
    QuerySerialization(serde_urlencoded::ser::Error),

    /// Path template contains placeholders without a value.
    #[display("Path '{template}' is missing required arguments: {missing:?}")]
    #[from(skip)]
    MissingPathParameter {
        /// The path template that couldn't be resolved.
        template: String,
        /// Names of the unbound placeholders, sorted.
        missing: Vec<String>,
    },

    /// Path parameter value is a dot segment.
    ///
    /// `.` and `..` would be collapsed by URL normalization and target another resource.
    #[display("Path '{template}' argument '{name}' cannot be the dot segment '{value}'")]
    #[from(skip)]
    DotSegmentPathParameter {
        /// The path template being resolved.
        template: String,
        /// Name of the placeholder.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// Parameter value cannot be rendered as text.
    ///
    /// Occurs with objects, nested arrays and values that fail to serialize.
    #[display("Unsupported parameter value: {message}. Got: {value}")]
    #[from(skip)]
    UnsupportedParameterValue {
        /// Specific error message describing the conversion failure.
        message: String,
        /// The value that failed to convert.
        value: serde_json::Value,
    },

    /// Response body does not match the expected type.
    #[display("Failed to deserialize JSON at '{path}' (status {status}): {error}\n{body}")]
    #[from(skip)]
    Decode {
        /// Status of the response.
        status: StatusCode,
        /// Location of the failure inside the document.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },

    /// Response body is binary and cannot be decoded as JSON.
    #[display("Unsupported output for {name} as JSON (status {status}):\n{output:?}")]
    #[from(skip)]
    UnsupportedJsonOutput {
        /// Status of the response.
        status: StatusCode,
        /// The actual response body received.
        output: RawBody,
        /// Name of the expected type.
        name: &'static str,
    },
}

impl From<super::AuthenticationError> for DispatchError {
    fn from(value: super::AuthenticationError) -> Self {
        Self::Transport(TransportError::Authentication(value))
    }
}
